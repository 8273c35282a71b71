use {
    crate::error::ValidationError,
    chrono::NaiveDate,
    std::{fmt, str::FromStr},
};

/// Format in which dates are shown to and typed by the user.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub postal_code: u32,
    pub city: String,
    pub birthday: Option<NaiveDate>,
}

impl Person {
    /// Create a person with the given name and no address or birthday.
    pub fn new<F: Into<String>, L: Into<String>>(first_name: F, last_name: L) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parses a date in [`DISPLAY_DATE_FORMAT`], e.g. `21.02.1999`.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DISPLAY_DATE_FORMAT).ok()
}

/// The raw text of a person as entered in an edit form.
///
/// Nothing about the contents is guaranteed until [`PersonForm::validate`]
/// succeeds.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PersonForm {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// Empty means "no birthday".
    pub birthday: String,
}

impl PersonForm {
    pub fn from_person(person: &Person) -> Self {
        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            street: person.street.clone(),
            postal_code: person.postal_code.to_string(),
            city: person.city.clone(),
            birthday: person.birthday.as_ref().map(format_date).unwrap_or_default(),
        }
    }

    /// Checks every field and builds the person.
    ///
    /// All problems are collected, not just the first one.
    pub fn validate(&self) -> Result<Person, ValidationError> {
        let mut messages = Vec::new();

        let mut required = |value: &str, field: &str| {
            let value = value.trim();
            if value.is_empty() {
                messages.push(format!("No valid {field}!"));
            }
            value.to_owned()
        };
        let first_name = required(&self.first_name, "first name");
        let last_name = required(&self.last_name, "last name");
        let street = required(&self.street, "street");
        let city = required(&self.city, "city");

        let postal_code = self.postal_code.trim();
        let postal_code = if postal_code.is_empty() {
            messages.push("No valid postal code!".to_owned());
            None
        } else {
            match u32::from_str(postal_code) {
                Ok(postal_code) => Some(postal_code),
                Err(_) => {
                    messages.push("No valid postal code (must be an integer)!".to_owned());
                    None
                }
            }
        };

        let birthday = self.birthday.trim();
        let birthday = if birthday.is_empty() {
            None
        } else {
            let parsed = parse_date(birthday);
            if parsed.is_none() {
                messages.push("No valid birthday. Use the format dd.mm.yyyy!".to_owned());
            }
            parsed
        };

        match postal_code {
            Some(postal_code) if messages.is_empty() => Ok(Person {
                first_name,
                last_name,
                street,
                postal_code,
                city,
                birthday,
            }),
            _ => Err(ValidationError::new(messages)),
        }
    }
}
