//! Built-in locale data.

use serde::Serialize;

/// Symbols used when reading and writing numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimalNumberSymbols {
    /// Separates the integer and fractional parts.
    pub decimal_separator: char,
    /// Groups thousands.
    pub group_separator: char,
    /// Marks negative numbers.
    pub negative_sign: char,
    /// Marks percentages.
    pub percent_symbol: char,
    /// The local currency symbol.
    pub currency_symbol: &'static str,
}

/// Names used when reading and writing dates and times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeSymbols {
    /// AM and PM markers.
    pub ampms: [&'static str; 2],
    /// Full month names, January first.
    pub month_names: [&'static str; 12],
    /// Abbreviated month names.
    pub month_name_abbreviations: [&'static str; 12],
    /// Full weekday names, Sunday first.
    pub week_day_names: [&'static str; 7],
    /// Abbreviated weekday names.
    pub week_day_name_abbreviations: [&'static str; 7],
}

/// A locale and its symbols.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    /// BCP 47 language tag.
    pub tag: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Number symbols.
    pub decimal_number_symbols: DecimalNumberSymbols,
    /// Date and time symbols.
    pub date_time_symbols: DateTimeSymbols,
}

const ENGLISH_DATES: DateTimeSymbols = DateTimeSymbols {
    ampms: ["AM", "PM"],
    month_names: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    month_name_abbreviations: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    week_day_names: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    week_day_name_abbreviations: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
};

const fn english_numbers(currency_symbol: &'static str) -> DecimalNumberSymbols {
    DecimalNumberSymbols {
        decimal_separator: '.',
        group_separator: ',',
        negative_sign: '-',
        percent_symbol: '%',
        currency_symbol,
    }
}

pub(super) fn builtin() -> Vec<LocaleInfo> {
    vec![
        LocaleInfo {
            tag: "en-AU",
            name: "English (Australia)",
            decimal_number_symbols: english_numbers("$"),
            date_time_symbols: ENGLISH_DATES,
        },
        LocaleInfo {
            tag: "en-GB",
            name: "English (United Kingdom)",
            decimal_number_symbols: english_numbers("£"),
            date_time_symbols: ENGLISH_DATES,
        },
        LocaleInfo {
            tag: "en-US",
            name: "English (United States)",
            decimal_number_symbols: english_numbers("$"),
            date_time_symbols: ENGLISH_DATES,
        },
        LocaleInfo {
            tag: "de-DE",
            name: "Deutsch (Deutschland)",
            decimal_number_symbols: DecimalNumberSymbols {
                decimal_separator: ',',
                group_separator: '.',
                negative_sign: '-',
                percent_symbol: '%',
                currency_symbol: "€",
            },
            date_time_symbols: DateTimeSymbols {
                ampms: ["AM", "PM"],
                month_names: [
                    "Januar",
                    "Februar",
                    "März",
                    "April",
                    "Mai",
                    "Juni",
                    "Juli",
                    "August",
                    "September",
                    "Oktober",
                    "November",
                    "Dezember",
                ],
                month_name_abbreviations: [
                    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.",
                    "Okt.", "Nov.", "Dez.",
                ],
                week_day_names: [
                    "Sonntag",
                    "Montag",
                    "Dienstag",
                    "Mittwoch",
                    "Donnerstag",
                    "Freitag",
                    "Samstag",
                ],
                week_day_name_abbreviations: ["So.", "Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa."],
            },
        },
        LocaleInfo {
            tag: "fr-FR",
            name: "Français (France)",
            decimal_number_symbols: DecimalNumberSymbols {
                decimal_separator: ',',
                group_separator: '\u{202f}',
                negative_sign: '-',
                percent_symbol: '%',
                currency_symbol: "€",
            },
            date_time_symbols: DateTimeSymbols {
                ampms: ["AM", "PM"],
                month_names: [
                    "janvier",
                    "février",
                    "mars",
                    "avril",
                    "mai",
                    "juin",
                    "juillet",
                    "août",
                    "septembre",
                    "octobre",
                    "novembre",
                    "décembre",
                ],
                month_name_abbreviations: [
                    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.",
                    "oct.", "nov.", "déc.",
                ],
                week_day_names: [
                    "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
                ],
                week_day_name_abbreviations: [
                    "dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam.",
                ],
            },
        },
    ]
}
