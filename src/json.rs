//! JSON representation of the contacts
//!
//! Export only. The XML document remains the file format the contact list is read from.

use {
    crate::{xml::ISO_DATE_FORMAT, Person},
    serde::Serialize,
    std::io::Write,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPerson<'a> {
    first_name: &'a str,
    last_name: &'a str,
    street: &'a str,
    postal_code: u32,
    city: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    birthday: Option<String>,
}

impl<'a> From<&'a Person> for JsonPerson<'a> {
    fn from(person: &'a Person) -> Self {
        Self {
            first_name: &person.first_name,
            last_name: &person.last_name,
            street: &person.street,
            postal_code: person.postal_code,
            city: &person.city,
            birthday: person
                .birthday
                .map(|birthday| birthday.format(ISO_DATE_FORMAT).to_string()),
        }
    }
}

pub fn persons_to_json<'a, P, W>(writer: W, persons: P) -> serde_json::Result<()>
where
    P: IntoIterator<Item = &'a Person>,
    W: Write,
{
    serde_json::to_writer_pretty(
        writer,
        &persons.into_iter().map(JsonPerson::from).collect::<Vec<_>>(),
    )
}
