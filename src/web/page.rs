use std::fmt::Write;
use crate::pipeline::StatusMessage;

pub const TITLE: &str = "Blue Water Bottle Detection & Counting";
const SUBTITLE: &str = "AI Engineer Selection Test";
const DESCRIPTION: &str = "This application detects and counts blue water bottles \
    inside a plastic bag using a trained YOLOv8 model.";
const SIDEBAR_TITLE: &str = "Simulation Options";
const SIDEBAR_INFO: &str = "Select one of the test images to verify the model's performance.";
const SELECT_LABEL: &str = "Select Image for Detection";
const ORIGINAL_HEADING: &str = "Original Image";
const ACTION_HEADING: &str = "Action";
const RESULT_HEADING: &str = "Detection Result";
const BUTTON_LABEL: &str = "Detect and Count Bottles";
const BUTTON_BUSY_LABEL: &str = "Detecting objects...";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:260px;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
section{display:inline-block;margin:0 1rem 1rem 0;vertical-align:top}\
figure{display:inline-block;margin:0 1rem 1rem 0;vertical-align:top}\
img{max-width:560px;height:auto}\
.msg{padding:.75rem 1rem;border-radius:.4rem;margin:1rem 0}\
.success{background:#e6f4ea;color:#1e4620}\
.warning{background:#fff8e1;color:#663c00}\
.error{background:#fdecea;color:#611a15}";

/// Escapes text for HTML bodies and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Everything one response shows. Images are `data:` URIs.
#[derive(Debug, Default)]
pub struct Page<'a> {
    samples: &'a [String],
    selected: &'a str,
    model_error: Option<String>,
    original: Option<String>,
    image_error: Option<String>,
    detected: Option<(String, String)>,
    status: Option<StatusMessage>,
}

impl<'a> Page<'a> {
    pub fn new(samples: &'a [String], selected: &'a str) -> Self {
        Self {
            samples,
            selected,
            ..Default::default()
        }
    }

    /// Replaces the whole body with the error; no controls are rendered.
    pub fn with_model_error(mut self, msg: &str) -> Self {
        self.model_error = Some(msg.to_string());
        self
    }

    pub fn with_original(mut self, data_uri: String) -> Self {
        self.original = Some(data_uri);
        self
    }

    pub fn with_image_error(mut self, msg: &str) -> Self {
        self.image_error = Some(msg.to_string());
        self
    }

    pub fn with_detected(mut self, data_uri: String, caption: String) -> Self {
        self.detected = Some((data_uri, caption));
        self
    }

    pub fn with_status(mut self, status: StatusMessage) -> Self {
        self.status = Some(status);
        self
    }

    pub fn to_html(&self) -> String {
        let mut body = String::new();

        if let Some(err) = &self.model_error {
            let _ = write!(body, "<main><h1>{}</h1>{}</main>", escape_html(TITLE), message("error", err));
            return document(&body);
        }

        body.push_str(&self.sidebar());
        body.push_str("<main>");
        let _ = write!(
            body,
            "<h1>{}</h1><h3>{}</h3><p>{}</p>",
            escape_html(TITLE),
            escape_html(SUBTITLE),
            escape_html(DESCRIPTION)
        );

        if let Some(err) = &self.image_error {
            body.push_str(&message("error", err));
        } else {
            let _ = write!(body, "<section><h3>{}</h3>", ORIGINAL_HEADING);
            if let Some(uri) = &self.original {
                body.push_str(&figure(uri, ORIGINAL_HEADING));
            }
            let _ = write!(body, "</section><section><h3>{}</h3>{}", ACTION_HEADING, self.detect_form());
            if self.detected.is_some() || self.status.is_some() {
                let _ = write!(body, "<h3>{}</h3>", RESULT_HEADING);
            }
            if let Some((uri, caption)) = &self.detected {
                body.push_str(&figure(uri, caption));
            }
            if let Some(status) = &self.status {
                body.push_str(&message(status.level(), &status.to_string()));
            }
            body.push_str("</section>");
        }

        body.push_str("</main>");
        document(&body)
    }

    fn sidebar(&self) -> String {
        let mut options = String::new();
        for name in self.samples {
            let selected = if name == self.selected { " selected" } else { "" };
            let name = escape_html(name);
            let _ = write!(options, "<option value=\"{name}\"{selected}>{name}</option>");
        }
        format!(
            "<aside><h2>{}</h2><p>{}</p><form method=\"get\" action=\"/\">\
             <label for=\"sample\">{}</label><br>\
             <select id=\"sample\" name=\"sample\" onchange=\"this.form.submit()\">{}</select>\
             </form></aside>",
            SIDEBAR_TITLE,
            escape_html(SIDEBAR_INFO),
            SELECT_LABEL,
            options
        )
    }

    fn detect_form(&self) -> String {
        format!(
            "<form method=\"post\" action=\"/detect\" \
             onsubmit=\"this.querySelector('button').textContent='{}'\">\
             <input type=\"hidden\" name=\"sample\" value=\"{}\">\
             <button type=\"submit\">{}</button></form>",
            BUTTON_BUSY_LABEL,
            escape_html(self.selected),
            escape_html(BUTTON_LABEL)
        )
    }
}

fn figure(uri: &str, caption: &str) -> String {
    format!(
        "<figure><img src=\"{}\" alt=\"{1}\"><figcaption>{1}</figcaption></figure>",
        uri,
        escape_html(caption)
    )
}

fn message(level: &str, text: &str) -> String {
    format!("<div class=\"msg {}\">{}</div>", level, escape_html(text))
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>{}</body></html>",
        escape_html(TITLE),
        STYLE,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<String> {
        vec!["Data_Bottles.png".to_string(), "Example_Test_Bottles.png".to_string()]
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn model_error_hides_controls() {
        let samples = samples();
        let html = Page::new(&samples, "Data_Bottles.png")
            .with_model_error("Error loading model: boom")
            .to_html();
        assert!(html.contains("Error loading model: boom"));
        assert!(!html.contains("<select"));
        assert!(!html.contains(BUTTON_LABEL));
    }

    #[test]
    fn selection_and_button_are_rendered() {
        let samples = samples();
        let html = Page::new(&samples, "Example_Test_Bottles.png").to_html();
        assert!(html.contains("<option value=\"Example_Test_Bottles.png\" selected>"));
        assert!(html.contains("<option value=\"Data_Bottles.png\">"));
        assert!(html.contains(BUTTON_LABEL));
        assert!(html.contains(BUTTON_BUSY_LABEL));
        assert!(html.contains("Blue Water Bottle Detection &amp; Counting"));
    }

    #[test]
    fn headings_and_sidebar_texts_are_rendered() {
        let samples = samples();
        let html = Page::new(&samples, "Data_Bottles.png")
            .with_original("data:image/png;base64,AA==".to_string())
            .to_html();
        assert!(html.contains("<h3>AI Engineer Selection Test</h3>"));
        assert!(html.contains(
            "This application detects and counts blue water bottles inside a plastic bag using a trained YOLOv8 model."
        ));
        assert!(html.contains("<h2>Simulation Options</h2>"));
        assert!(html.contains("Select one of the test images to verify the model&#39;s performance."));
        assert!(html.contains("<label for=\"sample\">Select Image for Detection</label>"));
        assert!(html.contains("<h3>Original Image</h3>"));
        assert!(html.contains("<h3>Action</h3>"));
        assert!(!html.contains("<h3>Detection Result</h3>"));

        let html = Page::new(&samples, "Data_Bottles.png")
            .with_detected("data:image/png;base64,AA==".to_string(), "Detected Bottles: 2".to_string())
            .with_status(StatusMessage::Success(2))
            .to_html();
        assert!(html.contains("<h3>Detection Result</h3>"));
        assert!(html.contains("<figcaption>Detected Bottles: 2</figcaption>"));
    }

    #[test]
    fn status_uses_its_level() {
        let samples = samples();
        let html = Page::new(&samples, "Data_Bottles.png")
            .with_status(StatusMessage::NoDetections)
            .to_html();
        assert!(html.contains("<div class=\"msg warning\">No bottles detected.</div>"));
    }
}
