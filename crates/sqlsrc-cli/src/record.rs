//! Loading source configuration records from disk

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use secrecy::SecretString;
use sqlsrc_spark::SparkConf;

/// On-disk record format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Toml,
    Json,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported record format for {}: expected a .toml or .json file",
                path.display()
            ),
        }
    }
}

/// Parse a record in the given format.
///
/// Parser errors are reduced to a position: their messages quote the
/// offending source line or value, which may be the access token.
pub fn parse(contents: &str, format: RecordFormat) -> Result<SparkConf> {
    match format {
        RecordFormat::Toml => toml::from_str(contents).map_err(|err| toml_error(contents, &err)),
        RecordFormat::Json => serde_json::from_str(contents).map_err(|err| json_error(&err)),
    }
}

fn toml_error(contents: &str, err: &toml::de::Error) -> anyhow::Error {
    match err.span() {
        Some(span) => {
            let (line, column) = line_column(contents, span.start);
            anyhow!("Invalid TOML record at line {line}, column {column}")
        }
        None => anyhow!("Invalid TOML record"),
    }
}

fn json_error(err: &serde_json::Error) -> anyhow::Error {
    let kind = match err.classify() {
        serde_json::error::Category::Io => "read error",
        serde_json::error::Category::Syntax => "syntax error",
        serde_json::error::Category::Data => "unexpected value",
        serde_json::error::Category::Eof => "unexpected end of input",
    };
    anyhow!(
        "Invalid JSON record: {kind} at line {}, column {}",
        err.line(),
        err.column()
    )
}

/// One-based line and column of a byte offset
fn line_column(contents: &str, offset: usize) -> (usize, usize) {
    let before = contents.get(..offset).unwrap_or(contents);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
    (line, column)
}

/// Read a record and apply an access token supplied out of band
pub fn load(path: &Path, access_token: Option<String>) -> Result<SparkConf> {
    let format = RecordFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut conf = parse(&contents, format)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if let Some(token) = access_token {
        tracing::debug!("using access token supplied on the command line");
        conf.access_token = Some(SecretString::from(token));
    }

    tracing::debug!(path = %path.display(), host = %conf.hostname, "loaded source record");
    Ok(conf)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RecordFormat::from_path(Path::new("a.toml")).unwrap(), RecordFormat::Toml);
        assert_eq!(RecordFormat::from_path(Path::new("a.JSON")).unwrap(), RecordFormat::Json);
        assert!(RecordFormat::from_path(Path::new("a.yaml")).is_err());
        assert!(RecordFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_load_toml_with_token_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "hostname = \"h\"\nhttpPath = \"/p\"\naccessToken = \"from-file\"").unwrap();

        let conf = load(file.path(), Some("from-flag".to_string())).unwrap();
        assert_eq!(conf.hostname, "h");
        assert_eq!(conf.access_token.unwrap().expose_secret(), "from-flag");
    }

    #[test]
    fn test_load_json_keeps_file_token() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"hostname":"h","port":8443,"httpPath":"/p","password":"from-file"}}"#).unwrap();

        let conf = load(file.path(), None).unwrap();
        assert_eq!(conf.port, "8443");
        assert_eq!(conf.access_token.unwrap().expose_secret(), "from-file");
    }

    #[test]
    fn test_toml_error_omits_token() {
        let contents = "hostname = \"h\"\nhttpPath = \"/p\"\naccessToken = dapi-SECRET-123\n";
        let err = parse(contents, RecordFormat::Toml).err().expect("bare value should not parse");
        let message = format!("{err:#}");
        assert!(!message.contains("dapi-SECRET-123"), "token leaked: {message}");
        assert!(message.contains("line 3"), "position missing: {message}");
    }

    #[test]
    fn test_toml_type_error_omits_value() {
        let contents = "hostname = \"h\"\naccessToken = 1234567890\n";
        let err = parse(contents, RecordFormat::Toml).err().expect("integer token should not parse");
        assert!(!format!("{err:#}").contains("1234567890"));
    }

    #[test]
    fn test_json_error_omits_token() {
        let err = parse(r#"{"accessToken":1234567890}"#, RecordFormat::Json)
            .err()
            .expect("integer token should not parse");
        let message = format!("{err:#}");
        assert!(!message.contains("1234567890"), "token leaked: {message}");
        assert!(message.contains("unexpected value"));
    }

    #[test]
    fn test_json_syntax_error_omits_token() {
        let err = parse(r#"{"accessToken":"dapi-SECRET-123" "#, RecordFormat::Json)
            .err()
            .expect("truncated record should not parse");
        assert!(!format!("{err:#}").contains("dapi-SECRET-123"));
    }

    #[test]
    fn test_load_error_omits_token() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "hostname = \"h\"\naccessToken = dapi-SECRET-123").unwrap();

        let err = load(file.path(), None).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Failed to parse"));
        assert!(!message.contains("dapi-SECRET-123"));
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("ab", 0), (1, 1));
        assert_eq!(line_column("ab", 99), (1, 3));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load(file.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}
