use {
    crate::Person,
    chrono::{Datelike, Month},
};

/// Number of birthdays in each month, January first.
///
/// Persons without a birthday are not counted.
pub fn birthday_histogram<'a, P>(persons: P) -> Vec<(Month, usize)>
where
    P: IntoIterator<Item = &'a Person>,
{
    let mut counts = [0usize; 12];
    for birthday in persons.into_iter().filter_map(|person| person.birthday) {
        counts[birthday.month0() as usize] += 1;
    }

    let mut month = Month::January;
    counts
        .into_iter()
        .map(|count| {
            let bar = (month, count);
            month = month.succ();
            bar
        })
        .collect()
}
