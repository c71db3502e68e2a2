//! Object-creation notification payloads.
//!
//! Every level of the payload is optional: the event source may deliver
//! partial or wrongly typed records, and each one is judged on its own.
//!
//! ```json
//! {
//!   "Records": [
//!     {
//!       "eventName": "ObjectCreated:Put",
//!       "s3": {
//!         "bucket": { "name": "ddpsourcebucket" },
//!         "object": { "key": "incoming/data+1.csv", "eTag": "9b2c...", "sequencer": "0A1B..." }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ddp_storage::ObjectRef;

/// A notification carrying zero or more records.
///
/// Records are kept as raw JSON so one badly shaped record cannot reject the
/// whole notification; see [`IncomingObject::from_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification {
  #[serde(default)]
  pub records: Option<Vec<Value>>,
}

impl Notification {
  pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(payload)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
  #[serde(default)]
  pub event_name: Option<String>,
  #[serde(default)]
  pub s3: Option<S3Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
  #[serde(default)]
  pub bucket: Option<BucketEntity>,
  #[serde(default)]
  pub object: Option<ObjectEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntity {
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntity {
  /// Form-encoded key (`+` for space, `%XX` escapes).
  #[serde(default)]
  pub key: Option<String>,
  #[serde(default)]
  pub size: Option<u64>,
  #[serde(default, rename = "eTag")]
  pub e_tag: Option<String>,
  #[serde(default)]
  pub sequencer: Option<String>,
}

/// Why a record could not be turned into an object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
  NullRecord,
  MissingS3,
  MissingBucket,
  MissingBucketName,
  MissingObject,
  MissingKey,
  EmptyField,
  UndecodableKey,
  InvalidShape,
}

impl fmt::Display for Malformed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let message = match self {
      Malformed::NullRecord => "record is null",
      Malformed::MissingS3 => "record has no s3 entity",
      Malformed::MissingBucket => "record has no bucket",
      Malformed::MissingBucketName => "bucket has no name",
      Malformed::MissingObject => "record has no object",
      Malformed::MissingKey => "object has no key",
      Malformed::EmptyField => "bucket name or object key is empty",
      Malformed::UndecodableKey => "object key is not valid URL encoding",
      Malformed::InvalidShape => "record fields have unexpected types",
    };
    f.write_str(message)
  }
}

/// An object named by a notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingObject {
  pub object: ObjectRef,
  /// Identifies the object revision; sequencer first, then ETag.
  pub version: Option<String>,
}

impl IncomingObject {
  /// Extract the object a raw notification record refers to.
  pub fn from_value(value: &Value) -> Result<Self, Malformed> {
    if value.is_null() {
      return Err(Malformed::NullRecord);
    }
    let record = EventRecord::deserialize(value).map_err(|_| Malformed::InvalidShape)?;
    Self::from_record(Some(&record))
  }

  /// Extract the object a record refers to.
  pub fn from_record(record: Option<&EventRecord>) -> Result<Self, Malformed> {
    let record = record.ok_or(Malformed::NullRecord)?;
    let s3 = record.s3.as_ref().ok_or(Malformed::MissingS3)?;
    let bucket = s3.bucket.as_ref().ok_or(Malformed::MissingBucket)?;
    let name = bucket.name.as_deref().ok_or(Malformed::MissingBucketName)?;
    let object = s3.object.as_ref().ok_or(Malformed::MissingObject)?;
    let raw_key = object.key.as_deref().ok_or(Malformed::MissingKey)?;

    let key = decode_key(raw_key)?;
    let object_ref = ObjectRef::new(name, key).map_err(|_| Malformed::EmptyField)?;

    Ok(Self {
      object: object_ref,
      version: object.sequencer.clone().or_else(|| object.e_tag.clone()),
    })
  }
}

/// Decode a form-encoded object key.
fn decode_key(raw: &str) -> Result<String, Malformed> {
  let spaced = raw.replace('+', " ");
  percent_decode_str(&spaced)
    .decode_utf8()
    .map(|key| key.into_owned())
    .map_err(|_| Malformed::UndecodableKey)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn record(bucket: &str, key: &str) -> EventRecord {
    serde_json::from_value(json!({
      "eventName": "ObjectCreated:Put",
      "s3": {
        "bucket": { "name": bucket },
        "object": { "key": key, "eTag": "etag-1" }
      }
    }))
    .unwrap()
  }

  #[test]
  fn test_parse_notification() {
    let notification = Notification::from_json(
      r#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{"key":"k.csv","size":12}}}, null]}"#,
    )
    .unwrap();

    let records = notification.records.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[1].is_null());
  }

  #[test]
  fn test_missing_records_field() {
    let notification = Notification::from_json("{}").unwrap();
    assert!(notification.records.is_none());
  }

  #[test]
  fn test_extract_object() {
    let incoming = IncomingObject::from_record(Some(&record("b", "dir/k.csv"))).unwrap();
    assert_eq!(incoming.object, ObjectRef::new("b", "dir/k.csv").unwrap());
    assert_eq!(incoming.version.as_deref(), Some("etag-1"));
  }

  #[test]
  fn test_key_is_url_decoded() {
    let incoming =
      IncomingObject::from_record(Some(&record("b", "my+data%2C2024%3A1.csv"))).unwrap();
    assert_eq!(incoming.object.key(), "my data,2024:1.csv");
  }

  #[test]
  fn test_undecodable_key() {
    let result = IncomingObject::from_record(Some(&record("b", "bad%FF.csv")));
    assert_eq!(result, Err(Malformed::UndecodableKey));
  }

  #[test]
  fn test_malformed_records() {
    assert_eq!(
      IncomingObject::from_record(None),
      Err(Malformed::NullRecord)
    );

    let no_s3 = EventRecord::default();
    assert_eq!(
      IncomingObject::from_record(Some(&no_s3)),
      Err(Malformed::MissingS3)
    );

    let no_bucket_name: EventRecord = serde_json::from_value(json!({
      "s3": { "bucket": {}, "object": { "key": "k" } }
    }))
    .unwrap();
    assert_eq!(
      IncomingObject::from_record(Some(&no_bucket_name)),
      Err(Malformed::MissingBucketName)
    );

    let no_object: EventRecord = serde_json::from_value(json!({
      "s3": { "bucket": { "name": "b" }, "object": null }
    }))
    .unwrap();
    assert_eq!(
      IncomingObject::from_record(Some(&no_object)),
      Err(Malformed::MissingObject)
    );

    assert_eq!(
      IncomingObject::from_record(Some(&record("", "k.csv"))),
      Err(Malformed::EmptyField)
    );
    assert_eq!(
      IncomingObject::from_record(Some(&record("b", ""))),
      Err(Malformed::EmptyField)
    );
  }

  #[test]
  fn test_wrongly_typed_records_are_malformed() {
    let notification = Notification::from_json(
      r#"{"Records":[
        {"s3":{"bucket":{"name":"b"},"object":{"key":"k.csv"}}},
        {"s3":{"bucket":{"name":123},"object":{"key":"k.csv"}}},
        {"s3":"x"},
        "record",
        null
      ]}"#,
    )
    .unwrap();

    let results: Vec<_> = notification
      .records
      .unwrap()
      .iter()
      .map(IncomingObject::from_value)
      .collect();

    assert_eq!(
      results[0].as_ref().map(|o| o.object.key()),
      Ok("k.csv")
    );
    assert_eq!(results[1], Err(Malformed::InvalidShape));
    assert_eq!(results[2], Err(Malformed::InvalidShape));
    assert_eq!(results[3], Err(Malformed::InvalidShape));
    assert_eq!(results[4], Err(Malformed::NullRecord));
  }
}
