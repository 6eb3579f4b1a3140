//! Rewriting of uploaded workbook and data source documents.
//!
//! `.twb` / `.tds` files are XML. On publish the simulator patches the
//! connection user name when credentials are embedded, marks requested
//! sheets hidden and reads back the sheets that become views. Packaged
//! formats are stored untouched.

use crate::error::BuildResponseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

const PACKAGED_EXTENSIONS: &[&str] = &["twbx", "tdsx", "hyper"];

/// Sheet kinds that become views.
const SHEET_ELEMENTS: &[(&str, &str)] = &[("worksheet", "worksheet"), ("dashboard", "dashboard")];

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions<'a> {
    /// User name written into every `<connection>` element.
    pub connection_user: Option<&'a str>,
    /// Window names to mark `hidden='true'`.
    pub hidden_sheets: &'a [&'a str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub sheet_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub bytes: Vec<u8>,
    /// Visible sheets in document order; empty for packaged files.
    pub sheets: Vec<Sheet>,
}

pub fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .filter(|extension| !extension.is_empty())
}

pub fn is_packaged(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|extension| PACKAGED_EXTENSIONS.contains(&extension.as_str()))
}

pub fn rewrite(
    file_name: &str,
    bytes: &[u8],
    options: &RewriteOptions<'_>,
) -> Result<Rewritten, BuildResponseError> {
    if is_packaged(file_name) {
        return Ok(Rewritten {
            bytes: bytes.to_vec(),
            sheets: Vec::new(),
        });
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(BuildResponseError::NotText {
            file_name: file_name.to_string(),
        });
    }

    let malformed = |message: String| BuildResponseError::MalformedFile {
        file_name: file_name.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(bytes);
    let mut writer = Writer::new(Vec::with_capacity(bytes.len()));
    let mut buf = Vec::new();
    let mut sheets: Vec<Sheet> = Vec::new();
    let mut hidden: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(e.to_string()))?;
        let event = match event {
            Event::Eof => break,
            Event::Start(element) => {
                saw_root = true;
                let element = inspect(&element, options, &mut sheets, &mut hidden)
                    .map_err(&malformed)?;
                Event::Start(element)
            }
            Event::Empty(element) => {
                saw_root = true;
                let element = inspect(&element, options, &mut sheets, &mut hidden)
                    .map_err(&malformed)?;
                Event::Empty(element)
            }
            other => other.into_owned(),
        };
        writer
            .write_event(event)
            .map_err(|e| malformed(e.to_string()))?;
        buf.clear();
    }

    if !saw_root {
        return Err(malformed("document has no root element".to_string()));
    }

    sheets.retain(|sheet| !hidden.contains(&sheet.name));
    Ok(Rewritten {
        bytes: writer.into_inner(),
        sheets,
    })
}

/// Records sheets and hidden windows, and returns the element to write.
fn inspect(
    element: &BytesStart<'_>,
    options: &RewriteOptions<'_>,
    sheets: &mut Vec<Sheet>,
    hidden: &mut Vec<String>,
) -> Result<BytesStart<'static>, String> {
    let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let attributes = attributes_of(element)?;
    let name = attributes
        .iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.clone());

    match tag.as_str() {
        "connection" => {
            if let Some(user) = options.connection_user {
                return Ok(with_attribute(&tag, attributes, "username", user));
            }
        }
        "window" => {
            if let Some(name) = name {
                let already_hidden = attributes
                    .iter()
                    .any(|(key, value)| key == "hidden" && value == "true");
                if options.hidden_sheets.contains(&name.as_str()) {
                    hidden.push(name);
                    return Ok(with_attribute(&tag, attributes, "hidden", "true"));
                }
                if already_hidden {
                    hidden.push(name);
                }
            }
        }
        _ => {
            let sheet_type = SHEET_ELEMENTS
                .iter()
                .find(|(element, _)| *element == tag)
                .map(|(_, sheet_type)| *sheet_type);
            if let (Some(sheet_type), Some(name)) = (sheet_type, name) {
                if sheets.iter().all(|sheet| sheet.name != name) {
                    sheets.push(Sheet { name, sheet_type });
                }
            }
        }
    }
    Ok(with_attributes(&tag, attributes))
}

fn attributes_of(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, String> {
    element
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| e.to_string())?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

fn with_attributes(tag: &str, attributes: Vec<(String, String)>) -> BytesStart<'static> {
    let mut element = BytesStart::new(tag.to_string());
    for (key, value) in &attributes {
        element.push_attribute((key.as_str(), value.as_str()));
    }
    element
}

/// Sets `key` to `value`, keeping attribute order and appending when absent.
fn with_attribute(
    tag: &str,
    mut attributes: Vec<(String, String)>,
    key: &str,
    value: &str,
) -> BytesStart<'static> {
    match attributes.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, existing)) => *existing = value.to_string(),
        None => attributes.push((key.to_string(), value.to_string())),
    }
    with_attributes(tag, attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>
<workbook version='18.1'>
  <datasources>
    <datasource name='orders'>
      <connection class='postgres' server='db.example' username='old'/>
    </datasource>
  </datasources>
  <worksheets>
    <worksheet name='Overview'><table/></worksheet>
    <worksheet name='Details'><table/></worksheet>
    <worksheet name='Scratch'><table/></worksheet>
  </worksheets>
  <dashboards>
    <dashboard name='Summary'><zones/></dashboard>
  </dashboards>
  <windows>
    <window class='worksheet' name='Overview'/>
    <window class='worksheet' name='Details'/>
    <window class='worksheet' hidden='true' name='Scratch'/>
    <window class='dashboard' name='Summary'/>
  </windows>
</workbook>"#;

    fn sheet_names(rewritten: &Rewritten) -> Vec<&str> {
        rewritten.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    #[test]
    fn test_views_exclude_hidden_sheets() {
        let rewritten =
            rewrite("Sales.twb", WORKBOOK.as_bytes(), &RewriteOptions::default()).expect("rewrite");
        assert_eq!(sheet_names(&rewritten), vec!["Overview", "Details", "Summary"]);
        assert_eq!(rewritten.sheets[2].sheet_type, "dashboard");
    }

    #[test]
    fn test_requested_sheets_are_hidden() {
        let options = RewriteOptions {
            connection_user: None,
            hidden_sheets: &["Details"],
        };
        let rewritten = rewrite("Sales.twb", WORKBOOK.as_bytes(), &options).expect("rewrite");
        assert_eq!(sheet_names(&rewritten), vec!["Overview", "Summary"]);

        let text = String::from_utf8(rewritten.bytes).expect("utf-8");
        assert!(text.contains(r#"<window class="worksheet" name="Details" hidden="true"/>"#));
    }

    #[test]
    fn test_connection_user_is_embedded() {
        let options = RewriteOptions {
            connection_user: Some("svc_reader"),
            hidden_sheets: &[],
        };
        let rewritten = rewrite("Sales.twb", WORKBOOK.as_bytes(), &options).expect("rewrite");
        let text = String::from_utf8(rewritten.bytes).expect("utf-8");
        assert!(text.contains(r#"username="svc_reader""#));
        assert!(!text.contains("username='old'"));
    }

    #[test]
    fn test_packaged_files_are_opaque() {
        let bytes = vec![0x50, 0x4b, 0x03, 0x04, 0xff];
        let rewritten = rewrite("Sales.twbx", &bytes, &RewriteOptions::default()).expect("opaque");
        assert_eq!(rewritten.bytes, bytes);
        assert!(rewritten.sheets.is_empty());
    }

    #[test]
    fn test_parse_failures() {
        let error = rewrite("Sales.twb", &[0xff, 0xfe, 0x00], &RewriteOptions::default())
            .expect_err("binary");
        assert!(matches!(error, BuildResponseError::NotText { .. }));

        let error = rewrite("Sales.twb", b"<workbook><a></b></workbook>", &RewriteOptions::default())
            .expect_err("mismatched tags");
        assert!(matches!(error, BuildResponseError::MalformedFile { .. }));

        let error = rewrite("Sales.twb", b"just text", &RewriteOptions::default())
            .expect_err("no root");
        assert!(matches!(error, BuildResponseError::MalformedFile { .. }));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.TWBX").as_deref(), Some("twbx"));
        assert_eq!(extension_of("noext"), None);
        assert!(is_packaged("x.hyper"));
        assert!(!is_packaged("x.tds"));
    }
}
