use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A categorical attribute with a fixed set of wire values.
pub trait Choice: Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Human-readable name shown in the form.
    fn label(self) -> &'static str;
}

/// Declares a categorical attribute: wire value, display label, and parsing.
macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal, $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Choice for $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = FieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(FieldError::InvalidChoice(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice!(School {
    GabrielPereira => "GP", "Gabriel Pereira",
    MousinhoDaSilveira => "MS", "Mousinho da Silveira",
});

choice!(Sex {
    Female => "F", "Female",
    Male => "M", "Male",
});

choice!(Address {
    Urban => "U", "Urban",
    Rural => "R", "Rural",
});

choice!(FamilySize {
    AtMostThree => "LE3", "Three or fewer",
    MoreThanThree => "GT3", "Greater than 3",
});

choice!(ParentStatus {
    Together => "T", "Together",
    Apart => "A", "Apart",
});

choice!(Job {
    Teacher => "teacher", "Teacher",
    Health => "health", "Health",
    Services => "services", "Services",
    AtHome => "at_home", "At Home",
    Other => "other", "Other",
});

choice!(Reason {
    Course => "course", "Course Preference",
    Other => "other", "Other",
    Home => "home", "Close to Home",
    Reputation => "reputation", "Reputation",
});

choice!(Guardian {
    Mother => "mother", "Mother",
    Father => "father", "Father",
    Other => "other", "Other",
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Unknown field")]
    Unknown,
    #[error("Must be a whole number")]
    NotANumber,
    #[error("\"{0}\" is not a valid choice")]
    InvalidChoice(String),
    #[error("Must be yes or no")]
    NotYesNo,
}

/// One student's attributes, using the dataset's attribute names on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub school: School,
    pub sex: Sex,
    pub age: i32,
    pub address: Address,
    pub famsize: FamilySize,
    #[serde(rename = "Pstatus")]
    pub pstatus: ParentStatus,
    #[serde(rename = "Medu")]
    pub medu: i32,
    #[serde(rename = "Fedu")]
    pub fedu: i32,
    #[serde(rename = "Mjob")]
    pub mjob: Job,
    #[serde(rename = "Fjob")]
    pub fjob: Job,
    pub reason: Reason,
    pub guardian: Guardian,
    pub traveltime: i32,
    pub studytime: i32,
    pub failures: i32,
    #[serde(with = "yes_no")]
    pub schoolsup: bool,
    #[serde(with = "yes_no")]
    pub famsup: bool,
    #[serde(with = "yes_no")]
    pub paid: bool,
    #[serde(with = "yes_no")]
    pub activities: bool,
    #[serde(with = "yes_no")]
    pub nursery: bool,
    #[serde(with = "yes_no")]
    pub higher: bool,
    #[serde(with = "yes_no")]
    pub internet: bool,
    #[serde(with = "yes_no")]
    pub romantic: bool,
    pub famrel: i32,
    pub freetime: i32,
    pub goout: i32,
    #[serde(rename = "Dalc")]
    pub dalc: i32,
    #[serde(rename = "Walc")]
    pub walc: i32,
    pub health: i32,
    pub absences: i32,
    #[serde(rename = "G1")]
    pub g1: i32,
    #[serde(rename = "G2")]
    pub g2: i32,
}

impl StudentRecord {
    /// Wire names of every attribute, in dataset column order.
    pub const FIELDS: [&'static str; 32] = [
        "school", "sex", "age", "address", "famsize", "Pstatus", "Medu", "Fedu", "Mjob", "Fjob",
        "reason", "guardian", "traveltime", "studytime", "failures", "schoolsup", "famsup", "paid",
        "activities", "nursery", "higher", "internet", "romantic", "famrel", "freetime", "goout",
        "Dalc", "Walc", "health", "absences", "G1", "G2",
    ];

    /// Value of a numeric attribute, `None` for categorical or unknown names.
    pub fn numeric(&self, field: &str) -> Option<i32> {
        let value = match field {
            "age" => self.age,
            "Medu" => self.medu,
            "Fedu" => self.fedu,
            "traveltime" => self.traveltime,
            "studytime" => self.studytime,
            "failures" => self.failures,
            "famrel" => self.famrel,
            "freetime" => self.freetime,
            "goout" => self.goout,
            "Dalc" => self.dalc,
            "Walc" => self.walc,
            "health" => self.health,
            "absences" => self.absences,
            "G1" => self.g1,
            "G2" => self.g2,
            _ => return None,
        };
        Some(value)
    }

    fn numeric_mut(&mut self, field: &str) -> Option<&mut i32> {
        let slot = match field {
            "age" => &mut self.age,
            "Medu" => &mut self.medu,
            "Fedu" => &mut self.fedu,
            "traveltime" => &mut self.traveltime,
            "studytime" => &mut self.studytime,
            "failures" => &mut self.failures,
            "famrel" => &mut self.famrel,
            "freetime" => &mut self.freetime,
            "goout" => &mut self.goout,
            "Dalc" => &mut self.dalc,
            "Walc" => &mut self.walc,
            "health" => &mut self.health,
            "absences" => &mut self.absences,
            "G1" => &mut self.g1,
            "G2" => &mut self.g2,
            _ => return None,
        };
        Some(slot)
    }

    fn flag_mut(&mut self, field: &str) -> Option<&mut bool> {
        let slot = match field {
            "schoolsup" => &mut self.schoolsup,
            "famsup" => &mut self.famsup,
            "paid" => &mut self.paid,
            "activities" => &mut self.activities,
            "nursery" => &mut self.nursery,
            "higher" => &mut self.higher,
            "internet" => &mut self.internet,
            "romantic" => &mut self.romantic,
            _ => return None,
        };
        Some(slot)
    }

    /// Current value of any attribute, formatted as it travels on the wire.
    pub fn value_of(&self, field: &str) -> Option<String> {
        if let Some(n) = self.numeric(field) {
            return Some(n.to_string());
        }
        let text = match field {
            "school" => self.school.as_str(),
            "sex" => self.sex.as_str(),
            "address" => self.address.as_str(),
            "famsize" => self.famsize.as_str(),
            "Pstatus" => self.pstatus.as_str(),
            "Mjob" => self.mjob.as_str(),
            "Fjob" => self.fjob.as_str(),
            "reason" => self.reason.as_str(),
            "guardian" => self.guardian.as_str(),
            "schoolsup" => yes_no::as_str(self.schoolsup),
            "famsup" => yes_no::as_str(self.famsup),
            "paid" => yes_no::as_str(self.paid),
            "activities" => yes_no::as_str(self.activities),
            "nursery" => yes_no::as_str(self.nursery),
            "higher" => yes_no::as_str(self.higher),
            "internet" => yes_no::as_str(self.internet),
            "romantic" => yes_no::as_str(self.romantic),
            _ => return None,
        };
        Some(text.to_string())
    }

    /// Applies one raw form input to the record. On error the attribute keeps
    /// its previous value.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError> {
        if let Some(slot) = self.numeric_mut(field) {
            *slot = parse_whole_number(raw)?;
            return Ok(());
        }
        if let Some(slot) = self.flag_mut(field) {
            *slot = yes_no::parse(raw)?;
            return Ok(());
        }
        match field {
            "school" => self.school = raw.parse()?,
            "sex" => self.sex = raw.parse()?,
            "address" => self.address = raw.parse()?,
            "famsize" => self.famsize = raw.parse()?,
            "Pstatus" => self.pstatus = raw.parse()?,
            "Mjob" => self.mjob = raw.parse()?,
            "Fjob" => self.fjob = raw.parse()?,
            "reason" => self.reason = raw.parse()?,
            "guardian" => self.guardian = raw.parse()?,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }
}

impl Default for StudentRecord {
    fn default() -> Self {
        Self {
            school: School::GabrielPereira,
            sex: Sex::Female,
            age: 15,
            address: Address::Urban,
            famsize: FamilySize::MoreThanThree,
            pstatus: ParentStatus::Together,
            medu: 0,
            fedu: 0,
            mjob: Job::AtHome,
            fjob: Job::AtHome,
            reason: Reason::Course,
            guardian: Guardian::Mother,
            traveltime: 1,
            studytime: 1,
            failures: 0,
            schoolsup: false,
            famsup: false,
            paid: false,
            activities: false,
            nursery: false,
            higher: true,
            internet: false,
            romantic: false,
            famrel: 3,
            freetime: 3,
            goout: 3,
            dalc: 1,
            walc: 1,
            health: 3,
            absences: 0,
            g1: 10,
            g2: 10,
        }
    }
}

// Browsers submit number inputs as decimal text ("4" or "4.0").
fn parse_whole_number(raw: &str) -> Result<i32, FieldError> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i32>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Ok(f as i32),
        _ => Err(FieldError::NotANumber),
    }
}

pub(crate) mod yes_no {
    use super::*;

    pub fn as_str(flag: bool) -> &'static str {
        if flag {
            "yes"
        } else {
            "no"
        }
    }

    pub fn parse(raw: &str) -> Result<bool, FieldError> {
        match raw.trim() {
            "yes" => Ok(true),
            "no" => Ok(false),
            _ => Err(FieldError::NotYesNo),
        }
    }

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(as_str(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
