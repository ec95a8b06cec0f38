//! Page rendering for the single-page form

use std::fmt::Write;

use crate::models::{
    AddictionLevel, Engagement, FeatureRecord, Frequency, Gender, Location, ModelInfo, Platform,
    VideoCategory, WatchReason, WATCH_TIMES,
};

const STYLE: &str = r#"
body { background-color: #D3D3D3; color: #FF4500; font-family: sans-serif; }
.title { font-size: 36px; font-weight: bold; text-align: center; margin-bottom: 20px; }
.input-section { background-color: #FFFFFF; padding: 20px; border-radius: 10px; margin-bottom: 20px; }
.prediction { font-size: 24px; text-align: center; font-weight: bold; padding: 10px; border: 2px solid #FF4500; border-radius: 8px; }
.error { color: #B00020; background-color: #FDECEA; padding: 10px; border-radius: 8px; }
.sidebar { float: right; background-color: #FFFFFF; padding: 15px; border-radius: 10px; }
fieldset { border: 1px solid #FF4500; border-radius: 8px; margin-bottom: 15px; }
.footer { text-align: center; font-size: 14px; margin-top: 30px; color: #333333; }
"#;

/// Render the form. `result` is `None` until the trigger has fired.
pub fn render_page(
    info: &ModelInfo,
    input: &FeatureRecord,
    result: Option<&Result<AddictionLevel, String>>,
) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Addiction Level Predictor</title>\
         <style>{STYLE}</style></head><body>\
         <div class=\"sidebar\"><h3>Model Used</h3><p>{}</p></div>\
         <div class=\"title\">Addiction Level Predictor</div>\
         <form method=\"post\" action=\"/\"><div class=\"input-section\">",
        escape(&info.model_name)
    );

    let _ = write!(
        html,
        "<fieldset><legend>Personal Information</legend>\
         <label>Age <input type=\"number\" name=\"age\" min=\"1\" max=\"100\" step=\"1\" value=\"{}\"></label><br>\
         <label>Satisfaction (1 to 10) <input type=\"range\" name=\"satisfaction\" min=\"1\" max=\"10\" step=\"0.1\" value=\"{:.1}\"></label><br>\
         </fieldset><fieldset><legend>Preferences</legend>",
        input.age, input.satisfaction
    );

    select(&mut html, "Gender", "gender", Gender::ALL.iter().map(Gender::as_str), input.gender.as_str());
    select(&mut html, "Location", "location", Location::ALL.iter().map(Location::as_str), input.location.as_str());
    select(&mut html, "Platform", "platform", Platform::ALL.iter().map(Platform::as_str), input.platform.as_str());
    select(
        &mut html,
        "Video Category",
        "video_category",
        VideoCategory::ALL.iter().map(VideoCategory::as_str),
        input.video_category.as_str(),
    );
    select(&mut html, "Engagement Level", "engagement", Engagement::ALL.iter().map(Engagement::as_str), input.engagement.as_str());
    select(&mut html, "Frequency", "frequency", Frequency::ALL.iter().map(Frequency::as_str), input.frequency.as_str());
    select(
        &mut html,
        "Watch Reason",
        "watch_reason",
        WatchReason::ALL.iter().map(WatchReason::as_str),
        input.watch_reason.as_str(),
    );
    select(&mut html, "Watch Time", "watch_time", WATCH_TIMES.iter().copied(), &input.watch_time);

    html.push_str("</fieldset></div><button type=\"submit\">Predict Addiction Level</button></form>");

    match result {
        Some(Ok(level)) => {
            let _ = write!(html, "<div class=\"prediction\">Predicted Addiction Level: {}</div>", level);
        }
        Some(Err(message)) => {
            let _ = write!(html, "<div class=\"error\">{}</div>", escape(message));
        }
        None => {}
    }

    html.push_str("<div class=\"footer\">Developed by Tirth and Sparsh</div></body></html>");
    html
}

fn select<'a>(
    html: &mut String,
    label: &str,
    name: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) {
    let _ = write!(html, "<label>{label} <select name=\"{name}\">");
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{0}\"{marker}>{0}</option>", escape(option));
    }
    html.push_str("</select></label><br>");
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
