//! dBase III attribute tables (`.dbf`) and their `.cpg` encodings.

use chrono::{Datelike, NaiveDate, Utc};

use super::bytes::ByteReader;
use super::error::ShapefileError;
use crate::feature::{FieldKind, FieldValue};

const VERSION: u8 = 0x03;
const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const TERMINATOR: u8 = 0x0D;
const EOF_MARKER: u8 = 0x1A;
const DELETED: u8 = b'*';

/// Longest field name dBase allows, in bytes.
pub const MAX_NAME_LEN: usize = 10;
/// Widest character field.
pub const MAX_TEXT_WIDTH: usize = 254;

const INTEGER_WIDTH: u8 = 18;
/// Widest `N` column still read as an integer (sign plus 19 digits of i64).
const MAX_INTEGER_LEN: u8 = 20;
const FLOAT_WIDTH: u8 = 24;
const FLOAT_DECIMALS: u8 = 15;

/// Text encoding of `.dbf` strings, as declared by a `.cpg` sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    /// Interpret `.cpg` content. Unknown code pages fall back to UTF-8.
    pub fn from_cpg(text: &str) -> Self {
        let normalized: String = text
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "ISO88591" | "LATIN1" | "88591" | "1252" | "ANSI1252" | "CP1252" | "WINDOWS1252" => {
                Encoding::Latin1
            }
            _ => Encoding::Utf8,
        }
    }

    /// Content written to a `.cpg` file.
    pub fn cpg_name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|b| char::from(*b)).collect(),
        }
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Encode at most `max` bytes without splitting a character.
    fn encode_truncated(self, text: &str, max: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(max.min(text.len()));
        let mut buf = [0u8; 4];
        for c in text.chars() {
            let encoded: &[u8] = match self {
                Encoding::Utf8 => c.encode_utf8(&mut buf).as_bytes(),
                Encoding::Latin1 => {
                    buf[0] = u8::try_from(u32::from(c)).unwrap_or(b'?');
                    &buf[..1]
                }
            };
            if out.len() + encoded.len() > max {
                break;
            }
            out.extend_from_slice(encoded);
        }
        out
    }
}

/// A column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    /// dBase type letter: C, N, F, L, D (others are read as text)
    pub field_type: u8,
    pub length: u8,
    pub decimals: u8,
}

impl DbfField {
    /// The attribute kind this column decodes to.
    pub fn kind(&self) -> FieldKind {
        match self.field_type {
            b'N' if self.decimals == 0 && self.length <= MAX_INTEGER_LEN => FieldKind::Integer,
            b'N' | b'F' => FieldKind::Float,
            b'L' => FieldKind::Boolean,
            b'D' => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    /// Column definition sized for the given values.
    ///
    /// Text is as wide as the longest encoded value (1 to 254 bytes);
    /// integers are `N(18,0)` unless a value needs more room.
    pub fn for_values<'a>(
        name: impl Into<String>,
        kind: FieldKind,
        values: impl Iterator<Item = &'a FieldValue>,
        encoding: Encoding,
    ) -> Self {
        let (field_type, length, decimals) = match kind {
            FieldKind::Text => {
                let widest = values
                    .filter(|v| !v.is_null())
                    .map(|v| encoding.encode(&v.to_string()).len())
                    .max()
                    .unwrap_or(1);
                (b'C', widest.clamp(1, MAX_TEXT_WIDTH) as u8, 0)
            }
            FieldKind::Integer => {
                let widest = values
                    .filter_map(|v| match v {
                        FieldValue::Integer(i) => Some(i.to_string().len()),
                        _ => None,
                    })
                    .max()
                    .unwrap_or(0);
                (b'N', (widest as u8).max(INTEGER_WIDTH), 0)
            }
            FieldKind::Float => (b'N', FLOAT_WIDTH, FLOAT_DECIMALS),
            FieldKind::Boolean => (b'L', 1, 0),
            FieldKind::Date => (b'D', 8, 0),
        };
        Self {
            name: name.into(),
            field_type,
            length,
            decimals,
        }
    }
}

/// A decoded attribute table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbfTable {
    pub fields: Vec<DbfField>,
    /// One row per record, values in field order.
    pub records: Vec<Vec<FieldValue>>,
    /// Number of records flagged as deleted (still present in `records`).
    pub deleted: usize,
}

/// Decode a `.dbf` file.
pub fn read_dbf(bytes: &[u8], encoding: Encoding) -> Result<DbfTable, ShapefileError> {
    let mut r = ByteReader::new(bytes, ".dbf header");
    let _version = r.u8()?;
    r.skip(3)?;
    let record_count = r.u32_le()? as usize;
    let header_len = usize::from(r.u16_le()?);
    let record_len = usize::from(r.u16_le()?);
    r.skip(HEADER_LEN - r.position())?;

    if header_len < HEADER_LEN + 1 {
        return Err(ShapefileError::InvalidDbf(format!(
            "header length {} too small",
            header_len
        )));
    }

    let mut fields = Vec::new();
    while r.position() + DESCRIPTOR_LEN <= header_len {
        let descriptor = r.take(DESCRIPTOR_LEN)?;
        if descriptor[0] == TERMINATOR {
            break;
        }
        let name_bytes = &descriptor[..11];
        let name_end = name_bytes.iter().position(|b| *b == 0).unwrap_or(11);
        fields.push(DbfField {
            name: encoding.decode(&name_bytes[..name_end]).trim().to_string(),
            field_type: descriptor[11].to_ascii_uppercase(),
            length: descriptor[16],
            decimals: descriptor[17],
        });
    }

    let data_len: usize = 1 + fields.iter().map(|f| usize::from(f.length)).sum::<usize>();
    if data_len > record_len {
        return Err(ShapefileError::InvalidDbf(format!(
            "fields need {} bytes but records are {} bytes",
            data_len, record_len
        )));
    }

    let mut r = ByteReader::new(bytes, ".dbf record");
    r.seek(header_len)?;

    let mut table = DbfTable {
        fields,
        records: Vec::with_capacity(record_count.min(bytes.len() / record_len.max(1))),
        deleted: 0,
    };

    for _ in 0..record_count {
        let record = r.take(record_len)?;
        if record[0] == EOF_MARKER {
            break;
        }
        if record[0] == DELETED {
            table.deleted += 1;
        }

        let mut offset = 1;
        let mut row = Vec::with_capacity(table.fields.len());
        for field in &table.fields {
            let len = usize::from(field.length);
            row.push(decode_value(field, &record[offset..offset + len], encoding));
            offset += len;
        }
        table.records.push(row);
    }

    Ok(table)
}

fn decode_value(field: &DbfField, raw: &[u8], encoding: Encoding) -> FieldValue {
    let text = encoding.decode(raw);
    let text = text.trim_matches(|c: char| c == ' ' || c == '\0');
    if text.is_empty() {
        return FieldValue::Null;
    }

    match field.kind() {
        FieldKind::Text => FieldValue::Text(text.to_string()),
        FieldKind::Integer => match text.parse::<i64>() {
            Ok(v) => FieldValue::Integer(v),
            Err(_) => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => FieldValue::Integer(v.trunc() as i64),
                _ => FieldValue::Null,
            },
        },
        FieldKind::Float => match text.parse::<f64>() {
            Ok(v) => FieldValue::Float(v),
            Err(_) => FieldValue::Null,
        },
        FieldKind::Boolean => match text.as_bytes()[0] {
            b'T' | b't' | b'Y' | b'y' => FieldValue::Boolean(true),
            b'F' | b'f' | b'N' | b'n' => FieldValue::Boolean(false),
            _ => FieldValue::Null,
        },
        FieldKind::Date => NaiveDate::parse_from_str(text, "%Y%m%d")
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),
    }
}

/// Make field names valid for dBase: at most 10 bytes and unique
/// (case-insensitively). Collisions get a numeric suffix.
pub fn field_names<'a>(names: impl IntoIterator<Item = &'a str>, encoding: Encoding) -> Vec<String> {
    let mut taken: Vec<String> = Vec::new();
    let mut out = Vec::new();

    for name in names {
        let base = truncate_name(name, MAX_NAME_LEN, encoding);
        let base = if base.is_empty() { "FIELD".to_string() } else { base };

        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate.to_ascii_uppercase()) {
            let suffix = format!("_{}", n);
            let head = truncate_name(&base, MAX_NAME_LEN - suffix.len(), encoding);
            candidate = format!("{}{}", head, suffix);
            n += 1;
        }

        taken.push(candidate.to_ascii_uppercase());
        out.push(candidate);
    }

    out
}

fn truncate_name(name: &str, max: usize, encoding: Encoding) -> String {
    encoding.decode(&encoding.encode_truncated(name, max))
}

/// Encode a `.dbf` file. `records` hold one value per field, in field order.
///
/// Values are formatted according to their column; nulls are written blank.
pub fn encode_dbf(
    fields: &[DbfField],
    records: &[Vec<FieldValue>],
    encoding: Encoding,
) -> Result<Vec<u8>, ShapefileError> {
    let header_len = HEADER_LEN + fields.len() * DESCRIPTOR_LEN + 1;
    let record_len = 1 + fields.iter().map(|f| usize::from(f.length)).sum::<usize>();
    let header_len_u16 = u16::try_from(header_len)
        .map_err(|_| ShapefileError::TooLarge(format!("{} fields", fields.len())))?;
    let record_len_u16 = u16::try_from(record_len)
        .map_err(|_| ShapefileError::TooLarge(format!("record length {} bytes", record_len)))?;
    let record_count = u32::try_from(records.len())
        .map_err(|_| ShapefileError::TooLarge(format!("{} records", records.len())))?;

    let mut out = Vec::with_capacity(header_len + record_len * records.len() + 1);

    let today = Utc::now().date_naive();
    out.push(VERSION);
    out.push(u8::try_from(today.year() - 1900).unwrap_or(u8::MAX));
    out.push(today.month() as u8);
    out.push(today.day() as u8);
    out.extend_from_slice(&record_count.to_le_bytes());
    out.extend_from_slice(&header_len_u16.to_le_bytes());
    out.extend_from_slice(&record_len_u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for field in fields {
        let mut descriptor = [0u8; DESCRIPTOR_LEN];
        let name = encoding.encode_truncated(&field.name, MAX_NAME_LEN);
        descriptor[..name.len()].copy_from_slice(&name);
        descriptor[11] = field.field_type;
        descriptor[16] = field.length;
        descriptor[17] = field.decimals;
        out.extend_from_slice(&descriptor);
    }
    out.push(TERMINATOR);

    for (index, record) in records.iter().enumerate() {
        if record.len() != fields.len() {
            return Err(ShapefileError::record(
                index,
                format!("{} values for {} fields", record.len(), fields.len()),
            ));
        }
        out.push(b' ');
        for (field, value) in fields.iter().zip(record) {
            out.extend_from_slice(&encode_value(field, value, encoding));
        }
    }
    out.push(EOF_MARKER);

    Ok(out)
}

fn encode_value(field: &DbfField, value: &FieldValue, encoding: Encoding) -> Vec<u8> {
    let width = usize::from(field.length);
    let text = match (field.field_type, value) {
        (_, FieldValue::Null) => String::new(),
        (b'C', v) => {
            let mut bytes = encoding.encode_truncated(&v.to_string(), width);
            bytes.resize(width, b' ');
            return bytes;
        }
        (b'L', FieldValue::Boolean(b)) => String::from(if *b { "T" } else { "F" }),
        (b'D', FieldValue::Date(d)) => d.format("%Y%m%d").to_string(),
        (b'N' | b'F', FieldValue::Integer(i)) if field.decimals == 0 => i.to_string(),
        (b'N' | b'F', v) => match v.as_f64() {
            Some(f) => format_float(f, width, usize::from(field.decimals)),
            None => String::new(),
        },
        _ => String::new(),
    };

    let bytes = text.into_bytes();
    if bytes.len() >= width {
        return bytes[..width].to_vec();
    }
    // Numbers and the rest are right-aligned
    let mut out = vec![b' '; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Fixed-point when it fits, scientific notation otherwise; blank for NaN/inf.
fn format_float(value: f64, width: usize, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if decimals == 0 {
        return format!("{}", value.trunc());
    }
    let fixed = format!("{:.*}", decimals, value);
    if fixed.len() <= width {
        return fixed;
    }
    // Sign, digit, point, 'e', sign and exponent take at most 8 characters
    let precision = width.saturating_sub(8).max(1);
    format!("{:.*e}", precision, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_fields() -> Vec<DbfField> {
        vec![
            DbfField {
                name: "NAME".to_string(),
                field_type: b'C',
                length: 12,
                decimals: 0,
            },
            DbfField::for_values("POP", FieldKind::Integer, std::iter::empty(), Encoding::Utf8),
            DbfField::for_values("AREA", FieldKind::Float, std::iter::empty(), Encoding::Utf8),
            DbfField::for_values("ACTIVE", FieldKind::Boolean, std::iter::empty(), Encoding::Utf8),
            DbfField::for_values("FOUNDED", FieldKind::Date, std::iter::empty(), Encoding::Utf8),
        ]
    }

    #[test]
    fn test_encode_then_read_values() {
        let date = NaiveDate::from_ymd_opt(1901, 5, 17).unwrap();
        let records = vec![
            vec![
                FieldValue::from("Zürich"),
                FieldValue::Integer(-421_878),
                FieldValue::Float(87.88),
                FieldValue::Boolean(true),
                FieldValue::Date(date),
            ],
            vec![
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Null,
            ],
        ];
        let bytes = encode_dbf(&table_fields(), &records, Encoding::Utf8).unwrap();
        let table = read_dbf(&bytes, Encoding::Utf8).unwrap();

        assert_eq!(table.fields.len(), 5);
        assert_eq!(table.fields[1].kind(), FieldKind::Integer);
        assert_eq!(table.fields[2].kind(), FieldKind::Float);
        assert_eq!(table.records, records);
        assert_eq!(table.deleted, 0);
    }

    #[test]
    fn test_deleted_records_still_counted() {
        let fields = vec![DbfField {
            name: "ID".to_string(),
            field_type: b'N',
            length: 4,
            decimals: 0,
        }];
        let records = vec![vec![FieldValue::Integer(1)], vec![FieldValue::Integer(2)]];
        let mut bytes = encode_dbf(&fields, &records, Encoding::Utf8).unwrap();
        let header_len = HEADER_LEN + DESCRIPTOR_LEN + 1;
        bytes[header_len] = DELETED;

        let table = read_dbf(&bytes, Encoding::Utf8).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.deleted, 1);
    }

    #[test]
    fn test_latin1_text() {
        let fields = vec![DbfField {
            name: "CITY".to_string(),
            field_type: b'C',
            length: 8,
            decimals: 0,
        }];
        let records = vec![vec![FieldValue::from("Málaga")]];
        let bytes = encode_dbf(&fields, &records, Encoding::Latin1).unwrap();
        assert_eq!(read_dbf(&bytes, Encoding::Latin1).unwrap().records, records);
    }

    #[test]
    fn test_text_truncated_to_width() {
        let field = DbfField {
            name: "T".to_string(),
            field_type: b'C',
            length: 3,
            decimals: 0,
        };
        assert_eq!(encode_value(&field, &FieldValue::from("abcdef"), Encoding::Utf8), b"abc");
        // Two-byte 'é' must not be split
        assert_eq!(encode_value(&field, &FieldValue::from("aéé"), Encoding::Utf8), "aé".as_bytes());
    }

    #[test]
    fn test_text_width_from_values() {
        let values = [FieldValue::from("ab"), FieldValue::Null, FieldValue::from("abcde")];
        let field = DbfField::for_values("T", FieldKind::Text, values.iter(), Encoding::Utf8);
        assert_eq!(field.length, 5);

        let long = [FieldValue::from("x".repeat(400))];
        let field = DbfField::for_values("T", FieldKind::Text, long.iter(), Encoding::Utf8);
        assert_eq!(usize::from(field.length), MAX_TEXT_WIDTH);
    }

    #[test]
    fn test_wide_integers_widen_column() {
        let values = [FieldValue::Integer(i64::MIN)];
        let field = DbfField::for_values("BIG", FieldKind::Integer, values.iter(), Encoding::Utf8);
        assert_eq!(field.length, 20);
    }

    #[test]
    fn test_format_float_falls_back_to_exponent() {
        assert_eq!(format_float(1.5, 24, 15), "1.500000000000000");
        let huge = format_float(1e300, 24, 15);
        assert!(huge.len() <= 24);
        assert_eq!(huge.parse::<f64>().unwrap(), 1e300);
        assert_eq!(format_float(f64::NAN, 24, 15), "");
    }

    #[test]
    fn test_field_names_truncated_and_unique() {
        let names = field_names(
            ["population_total", "population_density", "id", "ID"],
            Encoding::Utf8,
        );
        assert_eq!(names, vec!["population", "populati_1", "id", "ID_1"]);
        assert!(names.iter().all(|n| n.len() <= MAX_NAME_LEN));
    }

    #[test]
    fn test_cpg_parsing() {
        assert_eq!(Encoding::from_cpg("UTF-8\n"), Encoding::Utf8);
        assert_eq!(Encoding::from_cpg("ISO-8859-1"), Encoding::Latin1);
        assert_eq!(Encoding::from_cpg("ANSI 1252"), Encoding::Latin1);
        assert_eq!(Encoding::from_cpg("something else"), Encoding::Utf8);
    }

    #[test]
    fn test_blank_header_rejected() {
        let bytes = [0u8; HEADER_LEN];
        assert!(matches!(read_dbf(&bytes, Encoding::Utf8), Err(ShapefileError::InvalidDbf(_))));
    }
}
