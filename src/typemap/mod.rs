pub mod mssql;
pub mod pg;

use crate::dialect::Dialect;
use crate::schema::ColumnDescriptor;

/// A raw engine type string split into its parts.
///
/// `int(11) unsigned` becomes base `int`, args `11`, unsigned; and
/// `timestamp(6) with time zone` becomes base `timestamp with time zone`, args `6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawType {
    pub base: String,
    pub args: Option<String>,
    pub unsigned: bool,
}

pub fn parse_type(raw: &str) -> RawType {
    let lower = raw.trim().to_ascii_lowercase();
    let (head, args, tail) = match (lower.find('('), lower.rfind(')')) {
        (Some(open), Some(close)) if close > open => (
            &lower[..open],
            Some(lower[open + 1..close].trim().to_string()),
            &lower[close + 1..],
        ),
        _ => (lower.as_str(), None, ""),
    };
    let mut words: Vec<&str> = head
        .split_whitespace()
        .chain(tail.split_whitespace())
        .collect();
    let unsigned = words.contains(&"unsigned");
    words.retain(|w| *w != "unsigned" && *w != "zerofill");
    RawType {
        base: words.join(" "),
        args: args.filter(|a| !a.is_empty()),
        unsigned,
    }
}

/// Map a column to its Sequelize `DataTypes` expression, dispatching by dialect.
pub fn map_column_type(col: &ColumnDescriptor, dialect: Dialect) -> String {
    if !col.special.is_empty() {
        return enum_type(&col.special);
    }
    let raw = parse_type(&col.data_type);
    let mapped = match dialect {
        Dialect::Postgres => pg::map_type(&raw),
        Dialect::Mssql => mssql::map_type(&raw),
        Dialect::Mysql | Dialect::Sqlite => None,
    };
    mapped.unwrap_or_else(|| map_common(&raw))
}

/// `DataTypes.ENUM("a", "b")`
pub fn enum_type(labels: &[String]) -> String {
    let quoted: Vec<String> = labels
        .iter()
        .map(|l| format!("\"{}\"", l.replace('"', "\\\"")))
        .collect();
    format!("DataTypes.ENUM({})", quoted.join(", "))
}

/// `DataTypes.NAME` or `DataTypes.NAME(args)`.
pub fn with_args(name: &str, args: Option<&str>) -> String {
    match args {
        Some(args) => format!("DataTypes.{name}({})", args.replace(' ', "")),
        None => format!("DataTypes.{name}"),
    }
}

fn integer(name: &str, raw: &RawType) -> String {
    if raw.unsigned {
        format!("DataTypes.{name}.UNSIGNED")
    } else {
        format!("DataTypes.{name}")
    }
}

/// Mapping shared by every engine: ANSI names plus the MySQL and SQLite spellings.
pub fn map_common(raw: &RawType) -> String {
    let args = raw.args.as_deref();
    match raw.base.as_str() {
        "bool" | "boolean" => "DataTypes.BOOLEAN".to_string(),
        "bit" | "tinyint" if args == Some("1") => "DataTypes.BOOLEAN".to_string(),
        "tinyint" => integer("TINYINT", raw),
        "smallint" => integer("SMALLINT", raw),
        "mediumint" => integer("MEDIUMINT", raw),
        "int" | "integer" | "year" => integer("INTEGER", raw),
        "bigint" => integer("BIGINT", raw),
        "float" | "real" => "DataTypes.FLOAT".to_string(),
        "double" | "double precision" => "DataTypes.DOUBLE".to_string(),
        "decimal" | "numeric" => with_args("DECIMAL", args),
        "char" | "character" | "nchar" => with_args("CHAR", args),
        "varchar" | "character varying" | "nvarchar" | "varchar2" => with_args("STRING", args),
        "text" | "tinytext" | "mediumtext" | "longtext" | "clob" => "DataTypes.TEXT".to_string(),
        "date" => "DataTypes.DATEONLY".to_string(),
        "time" | "time without time zone" => "DataTypes.TIME".to_string(),
        "datetime" | "timestamp" | "timestamp without time zone" => "DataTypes.DATE".to_string(),
        "json" => "DataTypes.JSON".to_string(),
        "uuid" => "DataTypes.UUID".to_string(),
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => {
            "DataTypes.BLOB".to_string()
        }
        "geometry" | "point" | "linestring" | "polygon" => "DataTypes.GEOMETRY".to_string(),
        "" => "DataTypes.STRING".to_string(),
        // Fallback: use the type name as-is, uppercased, when it is a plain identifier
        other => {
            let upper = other.to_ascii_uppercase();
            if upper.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                format!("DataTypes.{upper}")
            } else {
                tracing::debug!("No Sequelize type for {other}, using STRING");
                "DataTypes.STRING".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_column;

    fn mapped(data_type: &str, dialect: Dialect) -> String {
        map_column_type(&test_column(data_type), dialect)
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(
            parse_type("int(11) unsigned zerofill"),
            RawType {
                base: "int".to_string(),
                args: Some("11".to_string()),
                unsigned: true,
            }
        );
        assert_eq!(
            parse_type("timestamp(6) WITH TIME ZONE").base,
            "timestamp with time zone"
        );
        assert_eq!(parse_type("character varying(100)").args.as_deref(), Some("100"));
        assert_eq!(parse_type("text").args, None);
    }

    #[test]
    fn test_mysql_types() {
        assert_eq!(mapped("tinyint(1)", Dialect::Mysql), "DataTypes.BOOLEAN");
        assert_eq!(mapped("int(11)", Dialect::Mysql), "DataTypes.INTEGER");
        assert_eq!(mapped("int(10) unsigned", Dialect::Mysql), "DataTypes.INTEGER.UNSIGNED");
        assert_eq!(mapped("varchar(255)", Dialect::Mysql), "DataTypes.STRING(255)");
        assert_eq!(mapped("decimal(10, 2)", Dialect::Mysql), "DataTypes.DECIMAL(10,2)");
        assert_eq!(mapped("datetime", Dialect::Mysql), "DataTypes.DATE");
        assert_eq!(mapped("date", Dialect::Mysql), "DataTypes.DATEONLY");
        assert_eq!(mapped("longtext", Dialect::Mysql), "DataTypes.TEXT");
    }

    #[test]
    fn test_sqlite_types() {
        assert_eq!(mapped("INTEGER", Dialect::Sqlite), "DataTypes.INTEGER");
        assert_eq!(mapped("", Dialect::Sqlite), "DataTypes.STRING");
        assert_eq!(mapped("REAL", Dialect::Sqlite), "DataTypes.FLOAT");
    }

    #[test]
    fn test_enum_labels_win() {
        let col = ColumnDescriptor {
            special: vec!["draft".to_string(), "published".to_string()],
            ..test_column("enum('draft','published')")
        };
        assert_eq!(
            map_column_type(&col, Dialect::Mysql),
            r#"DataTypes.ENUM("draft", "published")"#
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(mapped("citext", Dialect::Mysql), "DataTypes.CITEXT");
        assert_eq!(mapped("USER-DEFINED", Dialect::Mysql), "DataTypes.STRING");
    }
}
