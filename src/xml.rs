//! XML representation of the contacts
//!
//! This module contains the code that serializes the contact list to and deserializes it from
//! the XML document stored on disk. Dates and numbers are written in fixed formats so a file
//! reads back the same regardless of the machine's locale.
//!
//! Reading walks the XML events directly instead of going through serde: the serde deserializer
//! trims text content, and free-text fields must come back exactly as they were written.

use {
    crate::{error::DocumentError, Person},
    chrono::NaiveDate,
    quick_xml::{
        events::{BytesStart, BytesText, Event},
        se::Serializer,
        Reader,
    },
    serde::Serialize,
    std::str::{self, FromStr},
};

/// Fixed, locale-independent format of dates in every export format.
pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const ROOT_ELEMENT: &str = "persons";
const PERSON_ELEMENT: &str = "person";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const INDENT_SIZE: usize = 2;

// ========================================================================== //
// =====> structs to encode the structure of the XML document <============== //
// ========================================================================== //

#[derive(Debug, Serialize)]
#[serde(rename = "persons")]
struct XmlPersons {
    #[serde(rename = "person")]
    persons: Vec<XmlPerson>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct XmlPerson {
    first_name: String,
    last_name: String,
    street: String,
    postal_code: u32,
    city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    birthday: Option<String>,
}

// ========================================================================== //
// =====> serialization <==================================================== //
// ========================================================================== //

/// Render the persons, in order, as an indented XML document.
pub fn persons_to_xml<'a, P>(persons: P) -> Result<String, DocumentError>
where
    P: IntoIterator<Item = &'a Person>,
{
    let document = XmlPersons {
        persons: persons.into_iter().map(XmlPerson::from).collect(),
    };

    let mut xml = String::from(XML_DECLARATION);
    xml.push('\n');
    let mut serializer = Serializer::new(&mut xml);
    serializer.indent(' ', INDENT_SIZE);
    document.serialize(serializer)?;
    xml.push('\n');
    Ok(xml)
}

impl From<&Person> for XmlPerson {
    fn from(person: &Person) -> Self {
        Self {
            first_name: person.first_name.to_owned(),
            last_name: person.last_name.to_owned(),
            street: person.street.to_owned(),
            postal_code: person.postal_code,
            city: person.city.to_owned(),
            birthday: person
                .birthday
                .map(|birthday| birthday.format(ISO_DATE_FORMAT).to_string()),
        }
    }
}

// ========================================================================== //
// =====> deserialization <================================================== //
// ========================================================================== //

/// The text of each field of one `person` element, as found in the document.
#[derive(Debug, Default)]
struct PersonFields {
    first_name: Option<String>,
    last_name: Option<String>,
    street: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
    birthday: Option<String>,
}

impl PersonFields {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        Some(match name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "street" => &mut self.street,
            "postalCode" => &mut self.postal_code,
            "city" => &mut self.city,
            "birthday" => &mut self.birthday,
            _ => return None,
        })
    }
}

/// Parse a contact document, keeping the order of its `person` elements.
pub fn persons_from_xml(document: &str) -> Result<Vec<Person>, DocumentError> {
    // the default reader configuration keeps whitespace in text events
    let mut reader = Reader::from_str(document);

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                expect_root(&element)?;
                break;
            }
            Event::Empty(element) => {
                expect_root(&element)?;
                return Ok(Vec::new());
            }
            Event::Text(text) => ignore_whitespace(&text)?,
            Event::CData(_) => return Err(DocumentError::UnexpectedText),
            Event::Eof => return Err(DocumentError::MissingRoot),
            _ => {}
        }
    }

    let mut persons = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(element) if element.name().as_ref() == PERSON_ELEMENT.as_bytes() => {
                persons.push(Person::try_from(read_person(&mut reader)?)?);
            }
            Event::Empty(element) if element.name().as_ref() == PERSON_ELEMENT.as_bytes() => {
                persons.push(Person::try_from(PersonFields::default())?);
            }
            Event::Start(element) | Event::Empty(element) => {
                return Err(DocumentError::UnexpectedElement(element_name(&element)));
            }
            Event::End(_) => return Ok(persons),
            Event::Text(text) => ignore_whitespace(&text)?,
            Event::CData(_) => return Err(DocumentError::UnexpectedText),
            Event::Eof => return Err(DocumentError::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_person(reader: &mut Reader<&[u8]>) -> Result<PersonFields, DocumentError> {
    let mut fields = PersonFields::default();
    loop {
        let (name, empty) = match reader.read_event()? {
            Event::Start(element) => (element_name(&element), false),
            Event::Empty(element) => (element_name(&element), true),
            Event::End(_) => return Ok(fields),
            Event::Text(text) => {
                ignore_whitespace(&text)?;
                continue;
            }
            Event::CData(_) => return Err(DocumentError::UnexpectedText),
            Event::Eof => return Err(DocumentError::UnexpectedEof),
            _ => continue,
        };

        let Some(slot) = fields.slot(&name) else {
            return Err(DocumentError::UnexpectedElement(name));
        };
        let value = if empty {
            String::new()
        } else {
            read_text(reader)?
        };
        if slot.replace(value).is_some() {
            return Err(DocumentError::DuplicateElement(name));
        }
    }
}

/// Collect the unmodified text up to the end of the current element.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, DocumentError> {
    let mut value = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(text) => value.push_str(&text.unescape()?),
            Event::CData(cdata) => value.push_str(str::from_utf8(&cdata)?),
            Event::End(_) => return Ok(value),
            Event::Start(element) | Event::Empty(element) => {
                return Err(DocumentError::UnexpectedElement(element_name(&element)));
            }
            Event::Eof => return Err(DocumentError::UnexpectedEof),
            _ => {}
        }
    }
}

fn expect_root(element: &BytesStart<'_>) -> Result<(), DocumentError> {
    let name = element_name(element);
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(DocumentError::UnexpectedRoot(name))
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Indentation between elements carries no data; any other text does not belong there.
fn ignore_whitespace(text: &BytesText<'_>) -> Result<(), DocumentError> {
    if text.iter().all(u8::is_ascii_whitespace) {
        Ok(())
    } else {
        Err(DocumentError::UnexpectedText)
    }
}

impl TryFrom<PersonFields> for Person {
    type Error = DocumentError;
    fn try_from(fields: PersonFields) -> Result<Self, DocumentError> {
        let required = |value: Option<String>, element: &'static str| {
            value.ok_or(DocumentError::MissingElement(element))
        };

        let postal_code = required(fields.postal_code, "postalCode")?;
        let postal_code = match u32::from_str(postal_code.trim()) {
            Ok(postal_code) => postal_code,
            Err(source) => {
                return Err(DocumentError::InvalidPostalCode {
                    value: postal_code,
                    source,
                })
            }
        };

        let birthday = fields
            .birthday
            .map(|value| match NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT) {
                Ok(date) => Ok(date),
                Err(source) => Err(DocumentError::InvalidBirthday { value, source }),
            })
            .transpose()?;

        Ok(Person {
            first_name: required(fields.first_name, "firstName")?,
            last_name: required(fields.last_name, "lastName")?,
            street: required(fields.street, "street")?,
            postal_code,
            city: required(fields.city, "city")?,
            birthday,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<persons>
  <person>
    <firstName>Hans</firstName>
    <lastName>Muster</lastName>
    <street>Somestreet</street>
    <postalCode>1234</postalCode>
    <city>Somecity</city>
    <birthday>1999-02-21</birthday>
  </person>
  <person>
    <firstName>Ruth</firstName>
    <lastName>Mueller</lastName>
    <street>Otherstreet</street>
    <postalCode>8000</postalCode>
    <city>Zurich</city>
  </person>
</persons>
"#;

    fn hans() -> Person {
        Person {
            first_name: "Hans".to_owned(),
            last_name: "Muster".to_owned(),
            street: "Somestreet".to_owned(),
            postal_code: 1234,
            city: "Somecity".to_owned(),
            birthday: NaiveDate::from_ymd_opt(1999, 2, 21),
        }
    }

    #[test]
    fn parses_documented_format() {
        let persons = persons_from_xml(SAMPLE).unwrap();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0], hans());
        assert_eq!(persons[1].full_name(), "Ruth Mueller");
        assert_eq!(persons[1].birthday, None);
    }

    #[test]
    fn accepts_declaration_and_empty_root() {
        let document = format!("{XML_DECLARATION}\n<persons/>\n");
        assert!(persons_from_xml(&document).unwrap().is_empty());
        assert!(persons_from_xml("<persons></persons>").unwrap().is_empty());
    }

    #[test]
    fn writes_indented_document_with_declaration() {
        let xml = persons_to_xml(&[hans()]).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("\n  <person>"));
        assert!(xml.contains("\n    <firstName>Hans</firstName>"));
        assert!(xml.contains("<postalCode>1234</postalCode>"));
        assert!(xml.contains("<birthday>1999-02-21</birthday>"));
    }

    #[test]
    fn missing_birthday_is_not_written() {
        let xml = persons_to_xml(&[Person::new("Ruth", "Mueller")]).unwrap();
        assert!(!xml.contains("birthday"));
    }

    #[test]
    fn escapes_markup_in_text() {
        let mut person = hans();
        person.street = "Fish & <Chips> Lane".to_owned();
        let xml = persons_to_xml(&[person.clone()]).unwrap();
        assert!(!xml.contains("<Chips>"));
        assert_eq!(persons_from_xml(&xml).unwrap(), [person]);
    }

    #[test]
    fn text_is_read_verbatim() {
        let document = SAMPLE
            .replace("<firstName>Hans<", "<firstName>  Hans<")
            .replace("<street>Somestreet<", "<street>   <")
            .replace("<city>Somecity<", "<city>Some\ncity\n<");
        let person = &persons_from_xml(&document).unwrap()[0];
        assert_eq!(person.first_name, "  Hans");
        assert_eq!(person.street, "   ");
        assert_eq!(person.city, "Some\ncity\n");
    }

    #[test]
    fn empty_elements_are_empty_text() {
        let document = SAMPLE.replace("<street>Somestreet</street>", "<street/>");
        assert_eq!(persons_from_xml(&document).unwrap()[0].street, "");
    }

    #[test]
    fn cdata_is_text() {
        let document = SAMPLE.replace("<city>Somecity<", "<city><![CDATA[<Some> city]]><");
        assert_eq!(persons_from_xml(&document).unwrap()[0].city, "<Some> city");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let document = SAMPLE.replace("<lastName>Muster</lastName>", "");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::MissingElement("lastName"))
        ));
    }

    #[test]
    fn unknown_element_is_rejected() {
        let document = SAMPLE.replace("<city>Somecity</city>", "<town>Somecity</town>");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::UnexpectedElement(name)) if name == "town"
        ));
    }

    #[test]
    fn repeated_field_is_rejected() {
        let document = SAMPLE.replace(
            "<city>Somecity</city>",
            "<city>Somecity</city><city>Other</city>",
        );
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::DuplicateElement(name)) if name == "city"
        ));
    }

    #[test]
    fn stray_text_is_rejected() {
        let document = SAMPLE.replace("<person>\n    <firstName>Hans", "<person>x<firstName>Hans");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::UnexpectedText)
        ));
    }

    #[test]
    fn wrong_root_element_is_rejected() {
        let document = SAMPLE.replace("persons>", "people>");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::UnexpectedRoot(name)) if name == "people"
        ));
    }

    #[test]
    fn unclosed_root_is_rejected() {
        let document = SAMPLE.replace("</persons>", "");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::UnexpectedEof)
        ));
    }

    #[test]
    fn non_numeric_postal_code_is_rejected() {
        let document = SAMPLE.replace("1234", "12a4");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::InvalidPostalCode { value, .. }) if value == "12a4"
        ));
    }

    #[test]
    fn locale_style_birthday_is_rejected() {
        let document = SAMPLE.replace("1999-02-21", "21.02.1999");
        assert!(matches!(
            persons_from_xml(&document),
            Err(DocumentError::InvalidBirthday { value, .. }) if value == "21.02.1999"
        ));
    }

    #[test]
    fn empty_document_has_no_root() {
        assert!(matches!(
            persons_from_xml(""),
            Err(DocumentError::MissingRoot)
        ));
    }
}
