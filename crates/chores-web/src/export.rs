//! XML export of the whole store.
//!
//! The document has a `<housechores>` root with one section per collection:
//!
//! ```xml
//! <housechores version="0.1.0">
//!   <roles><role id="1"><name>admin</name></role></roles>
//!   <persons>…</persons>
//!   <chores>…</chores>
//!   <actions><action id="1"><date>2015-10-01</date>…</action></actions>
//! </housechores>
//! ```
//!
//! Password hashes are never written.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use chores_core::{model::PersonId, view::Snapshot};
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{APP_VERSION, error::Error};

pub const CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Name offered to the browser on download.
pub const DOWNLOAD_NAME: &str = "housechores-export.xml";

type XmlWriter = Writer<Vec<u8>>;

/// Where the export requested by `person_id` lives.
pub fn export_path(dir: &Path, person_id: PersonId) -> PathBuf {
  dir.join(format!("export-{person_id}.xml"))
}

// ─── Rendering ───────────────────────────────────────────────────────────────

pub fn render(snapshot: &Snapshot) -> Result<Vec<u8>, Error> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);

  emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
  let mut root = BytesStart::new("housechores");
  root.push_attribute(("version", APP_VERSION));
  emit(&mut w, Event::Start(root))?;

  emit(&mut w, Event::Start(BytesStart::new("roles")))?;
  for role in &snapshot.roles {
    record(&mut w, "role", role.role_id, &[("name", role.name.clone())])?;
  }
  emit(&mut w, Event::End(BytesEnd::new("roles")))?;

  emit(&mut w, Event::Start(BytesStart::new("persons")))?;
  for person in &snapshot.persons {
    record(&mut w, "person", person.person_id, &[
      ("name", person.name.clone()),
      ("role_id", person.role_id.to_string()),
      ("must_change_password", person.must_change_password.to_string()),
    ])?;
  }
  emit(&mut w, Event::End(BytesEnd::new("persons")))?;

  emit(&mut w, Event::Start(BytesStart::new("chores")))?;
  for chore in &snapshot.chores {
    record(&mut w, "chore", chore.chore_id, &[("name", chore.name.clone())])?;
  }
  emit(&mut w, Event::End(BytesEnd::new("chores")))?;

  emit(&mut w, Event::Start(BytesStart::new("actions")))?;
  for action in &snapshot.actions {
    record(&mut w, "action", action.action_id, &[
      ("date", action.action_date.to_string()),
      ("person_id", action.person_id.to_string()),
      ("chore_id", action.chore_id.to_string()),
    ])?;
  }
  emit(&mut w, Event::End(BytesEnd::new("actions")))?;

  emit(&mut w, Event::End(BytesEnd::new("housechores")))?;
  Ok(w.into_inner())
}

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<(), Error> {
  w.write_event(event).map_err(|e| Error::Xml(e.to_string()))
}

/// `<tag id="..."><field>value</field>…</tag>`
fn record(
  w: &mut XmlWriter,
  tag: &str,
  id: i64,
  fields: &[(&str, String)],
) -> Result<(), Error> {
  let id = id.to_string();
  let mut start = BytesStart::new(tag);
  start.push_attribute(("id", id.as_str()));
  emit(w, Event::Start(start))?;
  for (name, value) in fields {
    emit(w, Event::Start(BytesStart::new(*name)))?;
    emit(w, Event::Text(BytesText::new(value)))?;
    emit(w, Event::End(BytesEnd::new(*name)))?;
  }
  emit(w, Event::End(BytesEnd::new(tag)))
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// Render `snapshot` and write it as `person_id`'s export, replacing any
/// earlier one.
pub async fn write_export(
  dir: &Path,
  person_id: PersonId,
  snapshot: &Snapshot,
) -> Result<PathBuf, Error> {
  let bytes = render(snapshot)?;
  tokio::fs::create_dir_all(dir).await?;
  let path = export_path(dir, person_id);
  tokio::fs::write(&path, bytes).await?;
  Ok(path)
}

/// Fails with [`Error::ExportMissing`] when `person_id` never exported.
pub async fn read_export(dir: &Path, person_id: PersonId) -> Result<Vec<u8>, Error> {
  match tokio::fs::read(export_path(dir, person_id)).await {
    Ok(bytes) => Ok(bytes),
    Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::ExportMissing),
    Err(e) => Err(e.into()),
  }
}

#[cfg(test)]
mod tests {
  use chores_core::model::{Action, Chore, Person, Role};
  use chrono::NaiveDate;

  use super::*;

  fn snapshot() -> Snapshot {
    Snapshot {
      roles:   vec![Role { role_id: 1, name: "admin".into() }],
      persons: vec![Person {
        person_id:            1,
        name:                 "admin".into(),
        role_id:              1,
        must_change_password: false,
        password_hash:        "$argon2id$do-not-leak".into(),
      }],
      chores:  vec![Chore { chore_id: 1, name: "dishes & pans".into() }],
      actions: vec![Action {
        action_id:   1,
        action_date: NaiveDate::from_ymd_opt(2015, 10, 1).unwrap(),
        person_id:   1,
        chore_id:    1,
      }],
    }
  }

  #[test]
  fn document_has_root_and_sections() {
    let xml = String::from_utf8(render(&snapshot()).unwrap()).unwrap();
    assert!(xml.starts_with("<?xml"), "{xml}");
    for tag in ["<housechores", "<roles>", "<persons>", "<chores>", "<actions>"] {
      assert!(xml.contains(tag), "missing {tag}: {xml}");
    }
    assert!(xml.contains("<action id=\"1\">"), "{xml}");
    assert!(xml.contains("<date>2015-10-01</date>"), "{xml}");
  }

  #[test]
  fn text_is_escaped_and_passwords_are_left_out() {
    let xml = String::from_utf8(render(&snapshot()).unwrap()).unwrap();
    assert!(xml.contains("dishes &amp; pans"), "{xml}");
    assert!(!xml.contains("argon2"), "{xml}");
  }

  #[test]
  fn empty_store_still_renders() {
    let xml = String::from_utf8(render(&Snapshot::default()).unwrap()).unwrap();
    assert!(xml.contains("<housechores"), "{xml}");
  }

  #[tokio::test]
  async fn written_exports_read_back_per_person() {
    let dir = tempfile::tempdir().unwrap();
    let exports = dir.path().join("exports");

    let path = write_export(&exports, 3, &snapshot()).await.unwrap();
    assert_eq!(path, exports.join("export-3.xml"));

    let bytes = read_export(&exports, 3).await.unwrap();
    assert_eq!(bytes, render(&snapshot()).unwrap());

    assert!(matches!(read_export(&exports, 4).await, Err(Error::ExportMissing)));
  }
}
