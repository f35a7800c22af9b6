//! The structured record extracted from an identity card.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Value substituted for any field without a match.
pub const NOT_FOUND: &str = "Not Found";

/// Fields of an [`ExtractedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IdNumber,
    Name,
    DateOfBirth,
    Gender,
    Address,
    PostalCode,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::IdNumber,
        Field::Name,
        Field::DateOfBirth,
        Field::Gender,
        Field::Address,
        Field::PostalCode,
    ];

    /// Serialized key of the field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::IdNumber => "idNumber",
            Self::Name => "name",
            Self::DateOfBirth => "dateOfBirth",
            Self::Gender => "gender",
            Self::Address => "address",
            Self::PostalCode => "postalCode",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IdNumber => "ID Number",
            Self::Name => "Name",
            Self::DateOfBirth => "Date of Birth",
            Self::Gender => "Gender",
            Self::Address => "Address",
            Self::PostalCode => "Postal Code",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Gender as printed on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse from a case-insensitive token.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed schema produced by one successful run.
///
/// Every field is always populated; a field without a match holds
/// [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// 12-digit number grouped as `dddd dddd dddd`.
    pub id_number: String,
    pub name: String,
    /// `DD/MM/YYYY`, not calendar-checked.
    pub date_of_birth: String,
    /// `MALE`, `FEMALE` or `OTHER`.
    pub gender: String,
    pub address: String,
    /// 6-digit postal code.
    pub postal_code: String,
}

impl ExtractedRecord {
    /// A record with every field set to the sentinel.
    pub fn not_found() -> Self {
        Self {
            id_number: NOT_FOUND.to_string(),
            name: NOT_FOUND.to_string(),
            date_of_birth: NOT_FOUND.to_string(),
            gender: NOT_FOUND.to_string(),
            address: NOT_FOUND.to_string(),
            postal_code: NOT_FOUND.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::IdNumber => &self.id_number,
            Field::Name => &self.name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Gender => &self.gender,
            Field::Address => &self.address,
            Field::PostalCode => &self.postal_code,
        }
    }

    /// Whether the field holds a real match.
    pub fn is_found(&self, field: Field) -> bool {
        self.get(field) != NOT_FOUND
    }

    /// Fields that fell back to the sentinel.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.is_found(*f))
            .collect()
    }

    /// Date of birth as a calendar date, when it is one.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_of_birth, "%d/%m/%Y").ok()
    }

    /// Advisory checks; the record itself is never altered.
    pub fn validate(&self) -> Vec<String> {
        let mut issues: Vec<String> = self
            .missing_fields()
            .into_iter()
            .map(|f| format!("Missing {}", f.label().to_lowercase()))
            .collect();

        if self.is_found(Field::DateOfBirth) && self.birth_date().is_none() {
            issues.push(format!(
                "Date of birth {} is not a valid calendar date",
                self.date_of_birth
            ));
        }

        issues
    }
}

impl Default for ExtractedRecord {
    fn default() -> Self {
        Self::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(ExtractedRecord::not_found()).unwrap();
        let obj = json.as_object().unwrap();
        for field in Field::ALL {
            assert_eq!(obj[field.key()], NOT_FOUND);
        }
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn test_missing_fields() {
        let record = ExtractedRecord {
            id_number: "1234 5678 9101".into(),
            gender: "MALE".into(),
            ..ExtractedRecord::not_found()
        };
        assert_eq!(
            record.missing_fields(),
            vec![Field::Name, Field::DateOfBirth, Field::Address, Field::PostalCode]
        );
    }

    #[test]
    fn test_validate_flags_impossible_date() {
        let record = ExtractedRecord {
            date_of_birth: "31/02/1990".into(),
            ..ExtractedRecord::not_found()
        };
        let issues = record.validate();
        assert!(issues.iter().any(|i| i.contains("31/02/1990")));
        assert_eq!(record.date_of_birth, "31/02/1990");
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!(Gender::from_str("female"), Some(Gender::Female));
        assert_eq!(Gender::from_str("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_str("unknown"), None);
    }
}
