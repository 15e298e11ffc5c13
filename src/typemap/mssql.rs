use super::{with_args, RawType};

/// MSSQL-only type names. `None` falls through to the shared mapping.
pub fn map_type(raw: &RawType) -> Option<String> {
    let args = raw.args.as_deref();
    let is_max = args == Some("max");

    let mapped = match raw.base.as_str() {
        "bit" => "DataTypes.BOOLEAN".to_string(),
        "varchar" | "nvarchar" if is_max => "DataTypes.TEXT".to_string(),
        "varbinary" if is_max => "DataTypes.BLOB".to_string(),
        "ntext" | "xml" => "DataTypes.TEXT".to_string(),
        "image" => "DataTypes.BLOB".to_string(),
        "money" => "DataTypes.DECIMAL(19,4)".to_string(),
        "smallmoney" => "DataTypes.DECIMAL(10,4)".to_string(),
        "datetime2" | "smalldatetime" | "datetimeoffset" => "DataTypes.DATE".to_string(),
        "uniqueidentifier" => "DataTypes.UUID".to_string(),
        "float" => "DataTypes.DOUBLE".to_string(),
        "real" => "DataTypes.REAL".to_string(),
        "nchar" => with_args("CHAR", args),
        "geography" => "DataTypes.GEOGRAPHY".to_string(),
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
        map_column_type(&test_column(data_type), Dialect::Mssql)
    }

    #[test]
    fn test_bit() {
        assert_eq!(mapped("bit"), "DataTypes.BOOLEAN");
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(mapped("tinyint"), "DataTypes.TINYINT");
        assert_eq!(mapped("smallint"), "DataTypes.SMALLINT");
        assert_eq!(mapped("int"), "DataTypes.INTEGER");
        assert_eq!(mapped("bigint"), "DataTypes.BIGINT");
    }

    #[test]
    fn test_string_types() {
        assert_eq!(mapped("nvarchar(50)"), "DataTypes.STRING(50)");
        assert_eq!(mapped("nvarchar(MAX)"), "DataTypes.TEXT");
        assert_eq!(mapped("varchar(MAX)"), "DataTypes.TEXT");
        assert_eq!(mapped("nchar(10)"), "DataTypes.CHAR(10)");
        assert_eq!(mapped("ntext"), "DataTypes.TEXT");
    }

    #[test]
    fn test_money_types() {
        assert_eq!(mapped("money"), "DataTypes.DECIMAL(19,4)");
        assert_eq!(mapped("smallmoney"), "DataTypes.DECIMAL(10,4)");
    }

    #[test]
    fn test_datetime_types() {
        assert_eq!(mapped("datetime"), "DataTypes.DATE");
        assert_eq!(mapped("datetime2"), "DataTypes.DATE");
        assert_eq!(mapped("datetimeoffset"), "DataTypes.DATE");
        assert_eq!(mapped("date"), "DataTypes.DATEONLY");
    }

    #[test]
    fn test_binary_types() {
        assert_eq!(mapped("varbinary(MAX)"), "DataTypes.BLOB");
        assert_eq!(mapped("image"), "DataTypes.BLOB");
        assert_eq!(mapped("uniqueidentifier"), "DataTypes.UUID");
    }
}
