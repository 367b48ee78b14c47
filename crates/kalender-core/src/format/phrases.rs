//! Localized phrases used by the date label formatter.
//!
//! Lookups that miss in the active language fall back to English. An empty
//! phrase is a real entry ("no word here"), distinct from a missing one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every phrase the formatter can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhraseKey {
    Today,
    Tomorrow,
    DayAfterTomorrow,
    InThreeDays,
    InFourDays,
    InFiveDays,
    InSixDays,
    InOneWeek,
    OneWeekLeft,
    TwoWeeksLeft,
    ThreeWeeksLeft,
    FourWeeksLeft,
    FiveWeeksLeft,
    SixWeeksLeft,
    /// Trailing word of a remaining-time phrase ("left").
    Left,
    /// Leading word of a remaining-time phrase ("noch").
    Still,
    Day,
    Days,
    /// Paucal form of "days" for languages that have one.
    DaysFew,
    Hour,
    Hours,
    /// Paucal form of "hours" for languages that have one.
    HoursFew,
}

impl PhraseKey {
    /// "N weeks left" phrase for a whole number of weeks, one through six.
    pub fn weeks_left(weeks: i64) -> Option<Self> {
        match weeks {
            1 => Some(Self::OneWeekLeft),
            2 => Some(Self::TwoWeeksLeft),
            3 => Some(Self::ThreeWeeksLeft),
            4 => Some(Self::FourWeeksLeft),
            5 => Some(Self::FiveWeeksLeft),
            6 => Some(Self::SixWeeksLeft),
            _ => None,
        }
    }
}

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    En,
    It,
    Es,
    Pl,
    Fr,
    De,
    Ru,
    Nl,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Self::En,
        Self::It,
        Self::Es,
        Self::Pl,
        Self::Fr,
        Self::De,
        Self::Ru,
        Self::Nl,
    ];

    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::It => "it",
            Self::Es => "es",
            Self::Pl => "pl",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ru => "ru",
            Self::Nl => "nl",
        }
    }

    /// Parses a language code; region suffixes (`de-AT`) are ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(primary))
    }

    /// Grammatical number category for a count.
    pub fn plural_form(&self, n: i64) -> PluralForm {
        let n = n.abs();
        match self {
            Self::Ru => {
                let (last, last_two) = (n % 10, n % 100);
                if last == 1 && last_two != 11 {
                    PluralForm::One
                } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
                    PluralForm::Few
                } else {
                    PluralForm::Many
                }
            }
            _ if n == 1 => PluralForm::One,
            _ => PluralForm::Many,
        }
    }

    fn column(&self) -> usize {
        match self {
            Self::En => 0,
            Self::It => 1,
            Self::Es => 2,
            Self::Pl => 3,
            Self::Fr => 4,
            Self::De => 5,
            Self::Ru => 6,
            Self::Nl => 7,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unsupported language: {}", s))
    }
}

/// Unknown codes fall back to English.
impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from_code(&code).unwrap_or_default()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

/// Grammatical number of a counted noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralForm {
    One,
    Few,
    Many,
}

type Row = [Option<&'static str>; 8];

// Columns: en, it, es, pl, fr, de, ru, nl
// Day buckets name their own offset; "left" means time remaining.
fn row(key: PhraseKey) -> Row {
    use PhraseKey::*;

    match key {
        Today => [
            Some("Today"),
            Some("Oggi"),
            Some("Hoy"),
            Some("Dzisiaj"),
            Some("Aujourd'hui"),
            Some("Heute"),
            Some("Сегодня"),
            Some("Vandaag"),
        ],
        Tomorrow => [
            Some("Tomorrow"),
            Some("Domani"),
            Some("Mañana"),
            Some("Jutro"),
            Some("Demain"),
            Some("Morgen"),
            Some("Завтра"),
            Some("Morgen"),
        ],
        DayAfterTomorrow => [
            Some("Day After Tomorrow"),
            Some("Dopodomani"),
            Some("Pasado mañana"),
            Some("Pojutrze"),
            Some("Après-demain"),
            Some("Übermorgen"),
            Some("Послезавтра"),
            Some("Overmorgen"),
        ],
        InThreeDays => [
            Some("In 3 days"),
            Some("In 3 giorni"),
            Some("En 3 días"),
            Some("Za 3 dni"),
            Some("Dans 3 jours"),
            Some("In 3 Tagen"),
            Some("Через 3 дня"),
            Some("Over 3 dagen"),
        ],
        InFourDays => [
            Some("In 4 days"),
            Some("In 4 giorni"),
            Some("En 4 días"),
            Some("Za 4 dni"),
            Some("Dans 4 jours"),
            Some("In 4 Tagen"),
            Some("Через 4 дня"),
            Some("Over 4 dagen"),
        ],
        InFiveDays => [
            Some("In 5 days"),
            Some("In 5 giorni"),
            Some("En 5 días"),
            Some("Za 5 dni"),
            Some("Dans 5 jours"),
            Some("In 5 Tagen"),
            Some("Через 5 дней"),
            Some("Over 5 dagen"),
        ],
        InSixDays => [
            Some("In 6 days"),
            Some("In 6 giorni"),
            Some("En 6 días"),
            Some("Za 6 dni"),
            Some("Dans 6 jours"),
            Some("In 6 Tagen"),
            Some("Через 6 дней"),
            Some("Over 6 dagen"),
        ],
        InOneWeek => [
            Some("In one week"),
            Some("In una settimana"),
            Some("En una semana"),
            Some("Za tydzień"),
            Some("Dans une semaine"),
            Some("In einer Woche"),
            Some("Через неделю"),
            Some("Binnen een week"),
        ],
        OneWeekLeft => [
            Some("One week left"),
            Some("Manca una settimana"),
            Some("Queda una semana"),
            Some("Został jeden tydzień"),
            Some("Reste une semaine"),
            Some("Noch eine Woche"),
            Some("Ещё неделя"),
            Some("Nog een week"),
        ],
        TwoWeeksLeft => [
            Some("Two weeks left"),
            Some("Mancano due settimane"),
            Some("Quedan dos semanas"),
            Some("Zostały dwa tygodnie"),
            Some("Il reste deux semaines"),
            Some("Noch zwei Wochen"),
            Some("Ещё две недели"),
            Some("Nog twee weken"),
        ],
        ThreeWeeksLeft => [
            Some("Three weeks left"),
            Some("Mancano tre settimane"),
            Some("Quedan tres semanas"),
            Some("Zostały trzy tygodnie"),
            Some("Il reste trois semaines"),
            Some("Noch drei Wochen"),
            Some("Ещё три недели"),
            Some("Nog drie weken"),
        ],
        FourWeeksLeft => [
            Some("Four weeks left"),
            Some("Mancano quattro settimane"),
            Some("Quedan cuatro semanas"),
            Some("Zostały cztery tygodnie"),
            Some("Il reste quatre semaines"),
            Some("Noch vier Wochen"),
            Some("Ещё четыре недели"),
            Some("Nog vier weken"),
        ],
        FiveWeeksLeft => [
            Some("Five weeks left"),
            Some("Mancano cinque settimane"),
            Some("Quedan cinco semanas"),
            Some("Zostało pięć tygodni"),
            Some("Il reste cinq semaines"),
            Some("Noch fünf Wochen"),
            Some("Ещё пять недель"),
            Some("Nog vijf weken"),
        ],
        SixWeeksLeft => [
            Some("Six weeks left"),
            Some("Mancano sei settimane"),
            Some("Quedan seis semanas"),
            Some("Zostało sześć tygodni"),
            Some("Il reste six semaines"),
            Some("Noch sechs Wochen"),
            Some("Ещё шесть недель"),
            Some("Nog zes weken"),
        ],
        Left => [
            Some("left"),
            Some("rimasti"),
            Some("restantes"),
            Some("pozostało"),
            Some("restants"),
            Some(""),
            Some("осталось"),
            Some("over"),
        ],
        Still => [
            Some(""),
            None,
            None,
            None,
            None,
            Some("Noch"),
            Some(""),
            Some("nog"),
        ],
        Day => [
            Some("day"),
            Some("giorno"),
            Some("día"),
            Some("dzień"),
            Some("jour"),
            Some("Tag"),
            Some("день"),
            Some("dag"),
        ],
        Days => [
            Some("days"),
            Some("giorni"),
            Some("días"),
            Some("dni"),
            Some("jours"),
            Some("Tage"),
            Some("дней"),
            Some("dagen"),
        ],
        DaysFew => [None, None, None, None, None, None, Some("дня"), None],
        Hour => [
            Some("hour"),
            Some("ora"),
            Some("hora"),
            Some("godzina"),
            Some("heure"),
            Some("Stunde"),
            Some("час"),
            Some("uur"),
        ],
        Hours => [
            Some("hours"),
            Some("ore"),
            Some("horas"),
            Some("godziny"),
            Some("heures"),
            Some("Stunden"),
            Some("часов"),
            Some("uur"),
        ],
        HoursFew => [None, None, None, None, None, None, Some("часа"), None],
    }
}

/// Phrase for `key` in `lang`, without fallback.
pub fn lookup(key: PhraseKey, lang: Language) -> Option<&'static str> {
    row(key)[lang.column()]
}

/// Phrase for `key` in `lang`, falling back to English.
pub fn translate(key: PhraseKey, lang: Language) -> &'static str {
    lookup(key, lang)
        .or_else(|| lookup(key, Language::En))
        .unwrap_or_default()
}
