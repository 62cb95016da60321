pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed document from `--input`, falling back to piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_document(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <deal.json|deal.yaml> or stdin required for {what}").into())
    }
}
