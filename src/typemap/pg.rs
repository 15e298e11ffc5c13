use super::{map_common, parse_type, with_args, RawType};

/// PostgreSQL-only type names, including `udt_name` spellings. `None` falls
/// through to the shared mapping.
pub fn map_type(raw: &RawType) -> Option<String> {
    let args = raw.args.as_deref();

    // Array types report their udt_name with a leading underscore
    if let Some(element) = raw.base.strip_prefix('_') {
        let element = parse_type(element);
        let inner = map_type(&element).unwrap_or_else(|| map_common(&element));
        return Some(format!("DataTypes.ARRAY({inner})"));
    }
    if let Some(element) = raw.base.strip_suffix("[]") {
        let element = parse_type(element);
        let inner = map_type(&element).unwrap_or_else(|| map_common(&element));
        return Some(format!("DataTypes.ARRAY({inner})"));
    }

    let mapped = match raw.base.as_str() {
        "int2" | "smallserial" => "DataTypes.SMALLINT".to_string(),
        "int4" | "serial" => "DataTypes.INTEGER".to_string(),
        "int8" | "bigserial" => "DataTypes.BIGINT".to_string(),
        "float4" => "DataTypes.REAL".to_string(),
        "float8" => "DataTypes.DOUBLE".to_string(),
        "bpchar" => with_args("CHAR", args),
        "timestamptz" | "timestamp with time zone" => "DataTypes.DATE".to_string(),
        "timetz" | "time with time zone" => "DataTypes.TIME".to_string(),
        "jsonb" => "DataTypes.JSONB".to_string(),
        "bytea" => "DataTypes.BLOB".to_string(),
        "money" => "DataTypes.DECIMAL(19,2)".to_string(),
        "inet" => "DataTypes.INET".to_string(),
        "cidr" => "DataTypes.CIDR".to_string(),
        "macaddr" => "DataTypes.MACADDR".to_string(),
        "citext" => "DataTypes.CITEXT".to_string(),
        "tsvector" => "DataTypes.TSVECTOR".to_string(),
        "geography" => "DataTypes.GEOGRAPHY".to_string(),
        "interval" | "xml" => "DataTypes.STRING".to_string(),
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use crate::dialect::Dialect;
    use crate::testutil::test_column;
    use crate::typemap::map_column_type;

    fn mapped(data_type: &str) -> String {
        map_column_type(&test_column(data_type), Dialect::Postgres)
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(mapped("int2"), "DataTypes.SMALLINT");
        assert_eq!(mapped("integer"), "DataTypes.INTEGER");
        assert_eq!(mapped("bigint"), "DataTypes.BIGINT");
        assert_eq!(mapped("bigserial"), "DataTypes.BIGINT");
    }

    #[test]
    fn test_string_types() {
        assert_eq!(mapped("character varying(100)"), "DataTypes.STRING(100)");
        assert_eq!(mapped("character(10)"), "DataTypes.CHAR(10)");
        assert_eq!(mapped("text"), "DataTypes.TEXT");
        assert_eq!(mapped("citext"), "DataTypes.CITEXT");
    }

    #[test]
    fn test_datetime_types() {
        assert_eq!(mapped("timestamp with time zone"), "DataTypes.DATE");
        assert_eq!(mapped("timestamp without time zone"), "DataTypes.DATE");
        assert_eq!(mapped("date"), "DataTypes.DATEONLY");
        assert_eq!(mapped("time without time zone"), "DataTypes.TIME");
    }

    #[test]
    fn test_numeric_with_precision() {
        assert_eq!(mapped("numeric(10,2)"), "DataTypes.DECIMAL(10,2)");
        assert_eq!(mapped("numeric"), "DataTypes.DECIMAL");
    }

    #[test]
    fn test_dialect_types() {
        assert_eq!(mapped("jsonb"), "DataTypes.JSONB");
        assert_eq!(mapped("json"), "DataTypes.JSON");
        assert_eq!(mapped("uuid"), "DataTypes.UUID");
        assert_eq!(mapped("bytea"), "DataTypes.BLOB");
        assert_eq!(mapped("boolean"), "DataTypes.BOOLEAN");
    }

    #[test]
    fn test_array_type() {
        assert_eq!(mapped("_int4"), "DataTypes.ARRAY(DataTypes.INTEGER)");
        assert_eq!(mapped("_text"), "DataTypes.ARRAY(DataTypes.TEXT)");
        assert_eq!(mapped("varchar[]"), "DataTypes.ARRAY(DataTypes.STRING)");
    }
}
