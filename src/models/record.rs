//! Feature record model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

use super::choices::{
    Engagement, Frequency, Gender, Location, Platform, VideoCategory, WatchReason, WATCH_TIMES,
};
use crate::logic::record::{FieldValue, Record};

/// Column names as seen by the preprocessor, in collection order
pub const COLUMNS: [&str; 10] = [
    "Age",
    "Satisfaction",
    "Gender",
    "Location",
    "Platform",
    "Video Category",
    "Engagement",
    "Frequency",
    "Watch Reason",
    "Watch Time",
];

/// The ten attributes collected per prediction request.
///
/// Numeric ranges mirror the form controls; everything else is constrained by
/// the option enums at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FeatureRecord {
    #[validate(range(min = 1, max = 100))]
    pub age: i64,
    #[validate(range(min = 1.0, max = 10.0), custom(function = "validate_finite"))]
    pub satisfaction: f64,
    pub gender: Gender,
    pub location: Location,
    pub platform: Platform,
    pub video_category: VideoCategory,
    pub engagement: Engagement,
    pub frequency: Frequency,
    pub watch_reason: WatchReason,
    #[validate(custom(function = "validate_watch_time"))]
    pub watch_time: String,
}

impl FeatureRecord {
    /// Assemble the named-column record handed to the preprocessor
    pub fn to_record(&self) -> Record {
        let values = [
            FieldValue::Number(self.age as f64),
            FieldValue::Number(self.satisfaction),
            FieldValue::text(self.gender.as_str()),
            FieldValue::text(self.location.as_str()),
            FieldValue::text(self.platform.as_str()),
            FieldValue::text(self.video_category.as_str()),
            FieldValue::text(self.engagement.as_str()),
            FieldValue::text(self.frequency.as_str()),
            FieldValue::text(self.watch_reason.as_str()),
            FieldValue::text(&self.watch_time),
        ];

        COLUMNS.into_iter().zip(values).collect()
    }

    /// Read urlencoded form fields one by one.
    ///
    /// Fields that are absent or do not parse keep their default value and are
    /// reported by column name, so the page can be re-rendered with everything
    /// else the user entered.
    pub fn from_form(fields: &HashMap<String, String>) -> (Self, Vec<&'static str>) {
        let mut input = Self::default();
        let mut invalid = Vec::new();

        read_field(fields, "age", COLUMNS[0], |v| v.trim().parse().ok(), &mut input.age, &mut invalid);
        read_field(fields, "satisfaction", COLUMNS[1], |v| v.trim().parse().ok(), &mut input.satisfaction, &mut invalid);
        read_field(fields, "gender", COLUMNS[2], Gender::from_label, &mut input.gender, &mut invalid);
        read_field(fields, "location", COLUMNS[3], Location::from_label, &mut input.location, &mut invalid);
        read_field(fields, "platform", COLUMNS[4], Platform::from_label, &mut input.platform, &mut invalid);
        read_field(fields, "video_category", COLUMNS[5], VideoCategory::from_label, &mut input.video_category, &mut invalid);
        read_field(fields, "engagement", COLUMNS[6], Engagement::from_label, &mut input.engagement, &mut invalid);
        read_field(fields, "frequency", COLUMNS[7], Frequency::from_label, &mut input.frequency, &mut invalid);
        read_field(fields, "watch_reason", COLUMNS[8], WatchReason::from_label, &mut input.watch_reason, &mut invalid);
        read_field(fields, "watch_time", COLUMNS[9], |v| Some(v.to_string()), &mut input.watch_time, &mut invalid);

        (input, invalid)
    }
}

fn read_field<T>(
    fields: &HashMap<String, String>,
    key: &str,
    column: &'static str,
    parse: impl Fn(&str) -> Option<T>,
    slot: &mut T,
    invalid: &mut Vec<&'static str>,
) {
    match fields.get(key).and_then(|raw| parse(raw.as_str())) {
        Some(value) => *slot = value,
        None => invalid.push(column),
    }
}

/// One short sentence per failing field, joined with `; `
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_keys()
        .map(|field| field.to_string())
        .map(|field| match field.as_str() {
            "age" => "Age must be a whole number between 1 and 100".to_string(),
            "satisfaction" => "Satisfaction must be a number between 1.0 and 10.0".to_string(),
            "watch_time" => "Watch Time must be one of the listed times".to_string(),
            other => format!("{} is invalid", other),
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

impl Default for FeatureRecord {
    /// Initial state of the form
    fn default() -> Self {
        Self {
            age: 25,
            satisfaction: 5.0,
            gender: Gender::Male,
            location: Location::India,
            platform: Platform::YouTube,
            video_category: VideoCategory::Gaming,
            engagement: Engagement::High,
            frequency: Frequency::Morning,
            watch_reason: WatchReason::Entertainment,
            watch_time: WATCH_TIMES[0].to_string(),
        }
    }
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

fn validate_watch_time(value: &str) -> Result<(), ValidationError> {
    if WATCH_TIMES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_watch_time"))
    }
}
