//! Binary VDF codec for shortcuts.vdf.
//!
//! Entries decode into an ordered field model so that every field —
//! including fields this crate knows nothing about — survives a
//! decode/encode round trip with its original value and position.
//! Entry index keys are positional and are regenerated sequentially
//! on encode.

use std::fs;
use std::path::Path;

use crate::SteamError;

/// Binary VDF type markers used in shortcuts.vdf.
const VDF_TYPE_OBJECT: u8 = 0x00;
const VDF_TYPE_STRING: u8 = 0x01;
const VDF_TYPE_INT32: u8 = 0x02;
const VDF_TYPE_END: u8 = 0x08;

/// One VDF field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(u32),
    Obj(Object),
}

/// An ordered keyed object. Field order is preserved exactly as
/// decoded; key lookup is case-insensitive to match Steam's mixed
/// `AppName`/`appname` conventions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub Vec<(String, Value)>);

impl Object {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<u32> {
        match self.get(key) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Replaces a field in place, keeping its position and original
    /// key casing; appends when the field does not exist yet.
    pub fn set(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            slot.1 = value;
        } else {
            self.0.push((key.to_string(), value));
        }
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, Value::Str(value.into()));
    }

    pub fn set_int(&mut self, key: &str, value: u32) {
        self.set(key, Value::Int(value));
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.0.push((key.into(), value));
    }

    /// String values of the nested `tags` object, in order.
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::Obj(obj)) => obj
                .0
                .iter()
                .filter_map(|(_, v)| match v {
                    Value::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

/// Reads and parses a shortcuts.vdf file.
pub fn load_shortcuts(path: &Path) -> Result<Vec<Object>, SteamError> {
    let data = fs::read(path)
        .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_shortcuts(&data)
}

/// Parses binary VDF data into the ordered entry list.
pub fn parse_shortcuts(data: &[u8]) -> Result<Vec<Object>, SteamError> {
    if data.len() < 3 {
        return Err(SteamError::Vdf("shortcuts file too small".into()));
    }

    let mut pos = 0;

    if data[pos] != VDF_TYPE_OBJECT {
        return Err(SteamError::Vdf(format!(
            "expected object marker at start, got 0x{:02x}",
            data[pos]
        )));
    }
    pos += 1;

    let (name, new_pos) = read_string(data, pos)?;
    pos = new_pos;

    if name != "shortcuts" {
        return Err(SteamError::Vdf(format!(
            "expected root key 'shortcuts', got '{name}'"
        )));
    }

    let (root, _) = parse_object(data, pos)?;

    let mut entries = Vec::with_capacity(root.0.len());
    for (key, value) in root.0 {
        match value {
            Value::Obj(obj) => entries.push(obj),
            _ => {
                return Err(SteamError::Vdf(format!(
                    "shortcut entry '{key}' is not an object"
                )));
            }
        }
    }

    Ok(entries)
}

/// Parses one object body (after its key) up to its END marker.
fn parse_object(data: &[u8], mut pos: usize) -> Result<(Object, usize), SteamError> {
    let mut obj = Object::default();

    while pos < data.len() {
        if data[pos] == VDF_TYPE_END {
            pos += 1;
            return Ok((obj, pos));
        }

        let type_byte = data[pos];
        pos += 1;

        let (key, new_pos) = read_string(data, pos)?;
        pos = new_pos;

        match type_byte {
            VDF_TYPE_STRING => {
                let (val, new_pos) = read_string(data, pos)?;
                pos = new_pos;
                obj.push(key, Value::Str(val));
            }
            VDF_TYPE_INT32 => {
                if pos + 4 > data.len() {
                    return Err(SteamError::Vdf(format!(
                        "unexpected end of data reading int32 for '{key}'"
                    )));
                }
                let val =
                    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
                pos += 4;
                obj.push(key, Value::Int(val));
            }
            VDF_TYPE_OBJECT => {
                let (nested, new_pos) = parse_object(data, pos)?;
                pos = new_pos;
                obj.push(key, Value::Obj(nested));
            }
            _ => {
                return Err(SteamError::Vdf(format!(
                    "unknown type marker 0x{type_byte:02x} for key '{key}' at pos {pos}"
                )));
            }
        }
    }

    Err(SteamError::Vdf("unexpected end of data in object".into()))
}

/// Encodes the entry list back to the binary container format.
///
/// Index keys are contiguous integers from zero; the container's keys
/// are positional and carry no meaning across rewrites.
pub fn write_shortcuts(entries: &[Object]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(VDF_TYPE_OBJECT);
    write_cstring(&mut out, "shortcuts");

    for (i, entry) in entries.iter().enumerate() {
        out.push(VDF_TYPE_OBJECT);
        write_cstring(&mut out, &i.to_string());
        write_object_body(&mut out, entry);
    }

    out.push(VDF_TYPE_END); // end of "shortcuts"
    out.push(VDF_TYPE_END); // end of root
    out
}

/// Atomically writes the encoded container to disk.
pub fn save_shortcuts(path: &Path, entries: &[Object]) -> Result<(), SteamError> {
    let data = write_shortcuts(entries);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SteamError::Io(format!("failed to create {}: {e}", parent.display())))?;
    }
    let tmp = path.with_extension("vdf.tmp");
    fs::write(&tmp, &data)
        .map_err(|e| SteamError::Io(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| SteamError::Io(format!("failed to replace {}: {e}", path.display())))?;
    Ok(())
}

fn write_object_body(out: &mut Vec<u8>, obj: &Object) {
    for (key, value) in &obj.0 {
        match value {
            Value::Str(s) => {
                out.push(VDF_TYPE_STRING);
                write_cstring(out, key);
                write_cstring(out, s);
            }
            Value::Int(v) => {
                out.push(VDF_TYPE_INT32);
                write_cstring(out, key);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Value::Obj(nested) => {
                out.push(VDF_TYPE_OBJECT);
                write_cstring(out, key);
                write_object_body(out, nested);
            }
        }
    }
    out.push(VDF_TYPE_END);
}

fn write_cstring(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0x00);
}

/// Reads a null-terminated string from data starting at pos.
fn read_string(data: &[u8], pos: usize) -> Result<(String, usize), SteamError> {
    let start = pos;
    let mut i = pos;
    while i < data.len() {
        if data[i] == 0x00 {
            let s = String::from_utf8_lossy(&data[start..i]).into_owned();
            return Ok((s, i + 1));
        }
        i += 1;
    }
    Err(SteamError::Vdf(format!(
        "unterminated string starting at pos {start}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal valid shortcuts.vdf binary.
    fn build_test_vdf(shortcuts: &[(&str, &str, &str, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");

        for (i, (name, exe, start_dir, app_id)) in shortcuts.iter().enumerate() {
            data.push(VDF_TYPE_OBJECT);
            data.extend_from_slice(i.to_string().as_bytes());
            data.push(0x00);

            data.push(VDF_TYPE_INT32);
            data.extend_from_slice(b"appid\x00");
            data.extend_from_slice(&app_id.to_le_bytes());

            data.push(VDF_TYPE_STRING);
            data.extend_from_slice(b"AppName\x00");
            data.extend_from_slice(name.as_bytes());
            data.push(0x00);

            data.push(VDF_TYPE_STRING);
            data.extend_from_slice(b"Exe\x00");
            data.extend_from_slice(exe.as_bytes());
            data.push(0x00);

            data.push(VDF_TYPE_STRING);
            data.extend_from_slice(b"StartDir\x00");
            data.extend_from_slice(start_dir.as_bytes());
            data.push(0x00);

            data.push(VDF_TYPE_END);
        }

        data.push(VDF_TYPE_END);
        data
    }

    #[test]
    fn parse_empty_shortcuts() {
        let data = build_test_vdf(&[]);
        let entries = parse_shortcuts(&data).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn parse_single_shortcut() {
        let data = build_test_vdf(&[("Test Game", "/usr/bin/game", "/home/user", 12345)]);
        let entries = parse_shortcuts(&data).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get_str("AppName"), Some("Test Game"));
        assert_eq!(entries[0].get_str("Exe"), Some("/usr/bin/game"));
        assert_eq!(entries[0].get_str("StartDir"), Some("/home/user"));
        assert_eq!(entries[0].get_int("appid"), Some(12345));
    }

    #[test]
    fn parse_multiple_shortcuts() {
        let data = build_test_vdf(&[
            ("Game A", "/bin/a", "/home", 100),
            ("Game B", "/bin/b", "/home", 200),
            ("Game C", "/bin/c", "/home", 300),
        ]);
        let entries = parse_shortcuts(&data).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].get_str("AppName"), Some("Game A"));
        assert_eq!(entries[2].get_int("appid"), Some(300));
    }

    #[test]
    fn key_lookup_is_case_insensitive() {
        let data = build_test_vdf(&[("Game", "/bin/g", "/home", 1)]);
        let entries = parse_shortcuts(&data).unwrap();
        assert_eq!(entries[0].get_str("appname"), Some("Game"));
        assert_eq!(entries[0].get_str("exe"), Some("/bin/g"));
    }

    #[test]
    fn set_preserves_position_and_casing() {
        let data = build_test_vdf(&[("Game", "/bin/old", "/home", 1)]);
        let mut entries = parse_shortcuts(&data).unwrap();
        entries[0].set_str("exe", "/bin/new");
        // The original "Exe" slot is updated, not appended.
        assert_eq!(entries[0].0[2].0, "Exe");
        assert_eq!(entries[0].get_str("Exe"), Some("/bin/new"));
    }

    #[test]
    fn tags_parse_in_order() {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");

        data.push(VDF_TYPE_INT32);
        data.extend_from_slice(b"appid\x00");
        data.extend_from_slice(&42u32.to_le_bytes());

        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"tags\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"0\x00RPG\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"1\x00Action\x00");
        data.push(VDF_TYPE_END);

        data.push(VDF_TYPE_END);
        data.push(VDF_TYPE_END);

        let entries = parse_shortcuts(&data).unwrap();
        assert_eq!(entries[0].tags(), vec!["RPG", "Action"]);
        assert!(entries[0].has_tag("RPG"));
        assert!(!entries[0].has_tag("rpg"));
    }

    #[test]
    fn unknown_fields_round_trip() {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");

        data.push(VDF_TYPE_INT32);
        data.extend_from_slice(b"appid\x00");
        data.extend_from_slice(&7u32.to_le_bytes());

        // Fields this crate does not own.
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"DevkitGameID\x00custom\x00");
        data.push(VDF_TYPE_INT32);
        data.extend_from_slice(b"IsHidden\x00");
        data.extend_from_slice(&1u32.to_le_bytes());

        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"AppName\x00Keep Me\x00");

        data.push(VDF_TYPE_END);
        data.push(VDF_TYPE_END);
        data.push(VDF_TYPE_END);

        let entries = parse_shortcuts(&data).unwrap();
        let rewritten = write_shortcuts(&entries);
        assert_eq!(rewritten, data);

        let reparsed = parse_shortcuts(&rewritten).unwrap();
        assert_eq!(reparsed, entries);
        assert_eq!(reparsed[0].get_str("DevkitGameID"), Some("custom"));
        assert_eq!(reparsed[0].get_int("IsHidden"), Some(1));
    }

    #[test]
    fn reindexing_is_sequential_from_zero() {
        let data = build_test_vdf(&[("A", "/a", "/", 1), ("B", "/b", "/", 2)]);
        let mut entries = parse_shortcuts(&data).unwrap();
        entries.remove(0);
        let rewritten = write_shortcuts(&entries);
        // The surviving entry is keyed "0" (after marker + "shortcuts\0" + marker).
        assert_eq!(&rewritten[12..14], b"0\x00");
        let reparsed = parse_shortcuts(&rewritten).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].get_str("AppName"), Some("B"));
    }

    #[test]
    fn tolerates_single_trailing_end() {
        // Some writers emit only one trailing END marker.
        let mut data = build_test_vdf(&[("A", "/a", "/", 1)]);
        assert_eq!(data.pop(), Some(VDF_TYPE_END));
        // Still exactly one END left closing the shortcuts object.
        let entries = parse_shortcuts(&data).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn reject_too_small() {
        assert!(parse_shortcuts(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn reject_wrong_root_key() {
        let mut data = vec![VDF_TYPE_OBJECT];
        data.extend_from_slice(b"wrong\x00");
        data.push(VDF_TYPE_END);
        assert!(parse_shortcuts(&data).is_err());
    }

    #[test]
    fn reject_truncated_entry() {
        let mut data = vec![VDF_TYPE_OBJECT];
        data.extend_from_slice(b"shortcuts\x00");
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");
        data.push(VDF_TYPE_INT32);
        data.extend_from_slice(b"appid\x00");
        data.extend_from_slice(&[0x01, 0x02]); // truncated int32
        assert!(parse_shortcuts(&data).is_err());
    }

    #[test]
    fn read_string_basic() {
        let data = b"hello\x00world";
        let (s, pos) = read_string(data, 0).unwrap();
        assert_eq!(s, "hello");
        assert_eq!(pos, 6);
    }

    #[test]
    fn read_string_unterminated() {
        let data = b"no null";
        assert!(read_string(data, 0).is_err());
    }

    #[test]
    fn save_and_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config").join("shortcuts.vdf");

        let data = build_test_vdf(&[("Game", "/bin/g", "/home", 5)]);
        let entries = parse_shortcuts(&data).unwrap();
        save_shortcuts(&path, &entries).unwrap();

        let loaded = load_shortcuts(&path).unwrap();
        assert_eq!(loaded, entries);
    }
}
