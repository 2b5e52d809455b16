use coinquote_core::{Currency, RegistryError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The id map compiled into the binary.
pub const BUNDLED_ID_MAP: &str = include_str!("../data/coin_id_map.json");

/// Load currencies from a JSON id-map file.
///
/// Expected shape: an array of objects with at least `id`, `name` and
/// `symbol`. Extra provider fields (`rank`, `is_active`, ...) are ignored.
/// Entries keep file order.
pub fn load_currencies_from_file(path: &Path) -> Result<Vec<Currency>, RegistryError> {
    let file = File::open(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        RegistryError::Parse(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// Decode currencies from an in-memory JSON id map.
pub fn parse_currencies(json: &str) -> Result<Vec<Currency>, RegistryError> {
    serde_json::from_str(json)
        .map_err(|e| RegistryError::Parse(format!("Failed to decode id map: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_map_decodes() {
        let currencies = parse_currencies(BUNDLED_ID_MAP).unwrap();
        assert!(!currencies.is_empty());
        assert_eq!(currencies[0].symbol, "BTC");
        assert_eq!(currencies[0].id, 1);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_currencies(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn test_load_from_file_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(
            &path,
            r#"[{"id": 2, "name": "Ethereum", "symbol": "ETH"}, {"id": 1, "name": "Bitcoin", "symbol": "BTC"}]"#,
        )
        .unwrap();

        let currencies = load_currencies_from_file(&path).unwrap();
        let ids: Vec<u32> = currencies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_currencies_from_file(&path).unwrap_err();
        match err {
            RegistryError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected io error, got {other:?}"),
        }
    }
}
