//! # Encode Subcommand
//!
//! Reads documents as a JSON array or as newline-delimited JSON objects,
//! encodes each through the collectible codec and writes the result.
//! Extended JSON wrappers (`$oid`, `$date`, `$uuid`, `$binary`) map to the
//! matching value types.
//!
//! ## Output formats
//!
//! - `hex`: one lowercase hex line per document (default)
//! - `tokens`: the indented token trace of each document
//! - `binary`: the encoded documents back to back, as a BSON stream

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use docwire_codec::writer::render_tokens;
use docwire_codec::{CodecConfig, CollectibleCodec, CollectibleDocumentCodec};
use docwire_core::{documents_from_json_stream, DocwireError, Value};

/// Arguments for the `docwire encode` subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON array or NDJSON input. `-` reads standard input.
    #[arg(long, short, default_value = "-")]
    pub input: PathBuf,

    /// Codec configuration (YAML). Built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
    pub format: OutputFormat,

    /// Output file. Standard output when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// How encoded documents are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Lowercase hex, one document per line.
    Hex,
    /// Indented token trace.
    Tokens,
    /// Raw bytes.
    Binary,
}

/// Execute the encode subcommand.
pub fn run_encode(args: &EncodeArgs) -> Result<u8> {
    let config = load_config(args.config.as_deref())?;
    let codec = CollectibleDocumentCodec::from_config(&config)
        .map_err(DocwireError::from)
        .context("building collectible codec")?;
    tracing::debug!(?config, "codec ready");

    let input = read_input(&args.input)?;
    let count = crate::with_output(args.output.as_deref(), |out| {
        encode_documents(&codec, &input, args.format, out)
    })?;

    tracing::info!(documents = count, format = ?args.format, "encode complete");
    Ok(0)
}

/// Load the codec configuration at `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(DocwireError::from)
        .with_context(|| format!("reading codec configuration {}", path.display()))?;
    CodecConfig::from_yaml_str(&text)
        .map_err(DocwireError::from)
        .with_context(|| format!("invalid codec configuration {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(DocwireError::from)
            .context("reading standard input")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .map_err(DocwireError::from)
            .with_context(|| format!("reading input {}", path.display()))
    }
}

/// Encode every document in `text` into `out`, returning how many were
/// written. Stops at the first document that fails.
pub fn encode_documents(
    codec: &CollectibleDocumentCodec,
    text: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<usize> {
    let documents = documents_from_json_stream(text)
        .map_err(DocwireError::from)
        .context("parsing input documents")?;
    let count = documents.len();

    for (index, mut document) in documents.into_iter().enumerate() {
        match format {
            OutputFormat::Hex => {
                let bytes = codec
                    .encode_to_vec(&mut document)
                    .map_err(DocwireError::from)
                    .with_context(|| format!("encoding document {index}"))?;
                writeln!(out, "{}", to_hex(&bytes)).map_err(DocwireError::from)?;
            }
            OutputFormat::Tokens => {
                let tokens = codec
                    .encode_to_tokens(&mut document)
                    .map_err(DocwireError::from)
                    .with_context(|| format!("encoding document {index}"))?;
                out.write_all(render_tokens(&tokens).as_bytes())
                    .map_err(DocwireError::from)?;
            }
            OutputFormat::Binary => {
                let bytes = codec
                    .encode_to_vec(&mut document)
                    .map_err(DocwireError::from)
                    .with_context(|| format!("encoding document {index}"))?;
                out.write_all(&bytes).map_err(DocwireError::from)?;
            }
        }
        let id = codec.get_id(&document).map(Value::to_json).unwrap_or_default();
        tracing::info!(index, %id, "encoded document");
    }

    Ok(count)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CollectibleDocumentCodec {
        CollectibleDocumentCodec::from_config(&CodecConfig::default()).unwrap()
    }

    fn encode(text: &str, format: OutputFormat) -> (usize, Vec<u8>) {
        let mut out = Vec::new();
        let count = encode_documents(&codec(), text, format, &mut out).unwrap();
        (count, out)
    }

    #[test]
    fn hex_lines_start_with_object_id() {
        let (count, out) = encode("{\"a\": 1}\n{\"b\": 2}\n", OutputFormat::Hex);
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            // length prefix, then 0x07 "_id" NUL
            assert_eq!(&line[8..18], "075f696400");
        }
    }

    #[test]
    fn supplied_id_is_kept() {
        let input = r#"[{"name": "Ada", "_id": {"$oid": "00112233445566778899aabb"}}]"#;
        let (_, out) = encode(input, OutputFormat::Hex);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(&text[18..42], "00112233445566778899aabb");
    }

    #[test]
    fn tokens_format_lists_id_first() {
        let (_, out) = encode(r#"{"x": true, "_id": 7}"#, OutputFormat::Tokens);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "{\n  _id:\n  7 (int32)\n  x:\n  true (bool)\n}\n");
    }

    #[test]
    fn binary_format_concatenates_documents() {
        let (count, out) = encode(r#"[{"_id": 1}, {"_id": 2}]"#, OutputFormat::Binary);
        assert_eq!(count, 2);
        // {_id: int32} is 4 + (1 + 4 + 4) + 1 bytes.
        assert_eq!(out.len(), 28);
        assert_eq!(&out[..4], &[14, 0, 0, 0]);
        assert_eq!(&out[14..18], &[14, 0, 0, 0]);
    }

    #[test]
    fn invalid_field_name_names_the_document() {
        let mut out = Vec::new();
        let err = encode_documents(&codec(), r#"[{"ok": 1}, {"$bad": 1}]"#, OutputFormat::Hex, &mut out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("encoding document 1"));
        // The first document was already written.
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn encode_failures_carry_docwire_errors() {
        let mut out = Vec::new();
        let err = encode_documents(&codec(), r#"{"$bad": 1}"#, OutputFormat::Tokens, &mut out)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocwireError>(),
            Some(DocwireError::Encode(docwire_core::EncodeError::Validation(_)))
        ));

        let err = encode_documents(&codec(), "[1]", OutputFormat::Hex, &mut out).unwrap_err();
        assert!(matches!(err.downcast_ref::<DocwireError>(), Some(DocwireError::Json(_))));
        assert_eq!(crate::exit_code(&err), 1);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let mut out = Vec::new();
        let err = encode_documents(&codec(), "[1, 2]", OutputFormat::Hex, &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("parsing input documents"));
    }

    #[test]
    fn missing_config_means_defaults() {
        assert_eq!(load_config(None).unwrap(), CodecConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codec.yaml");
        std::fs::write(&path, "id_generator: uuid\nmax_depth: 4\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn bad_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codec.yaml");
        std::fs::write(&path, "max_depth: 0\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("codec.yaml"));
        assert!(matches!(
            err.downcast_ref::<DocwireError>(),
            Some(DocwireError::Configuration(_))
        ));
        assert_eq!(crate::exit_code(&err), crate::EXIT_CONFIGURATION);
    }
}
