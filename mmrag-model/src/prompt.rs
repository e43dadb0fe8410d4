//! Grading instructions sent to the judge.

use mmrag_eval::{EvaluationRequest, Metric, Modality};

use crate::convert::{ContentPart, Message};

/// Lowest and highest grade the judge is asked to give.
pub const GRADE_SCALE: (i64, i64) = (1, 5);

const RESPONSE_FORMAT: &str = "Respond only with a JSON object of the form \
{\"grade\": <integer>, \"reason\": \"<one or two sentences>\"} and nothing else.";

/// What the judge is asked to assess for `metric`.
pub fn instruction(metric: Metric) -> &'static str {
    match metric {
        Metric::AnswerCorrectness => {
            "Grade how correct the generated answer is compared to the reference answer. \
             Penalize factual disagreement and missing key facts, not wording differences."
        }
        Metric::AnswerRelevancy => {
            "Grade how directly the generated answer addresses the user query. \
             Penalize off-topic, evasive or padded content."
        }
        Metric::ImageFaithfulness => {
            "Grade how well the generated answer is supported by the provided image. \
             Penalize claims that the image contradicts or does not show."
        }
        Metric::ImageContextRelevancy => {
            "Grade how relevant the provided image is for answering the user query."
        }
        Metric::TextFaithfulness => {
            "Grade how well the generated answer is supported by the provided text context. \
             Penalize claims that the context contradicts or does not contain."
        }
        Metric::TextContextRelevancy => {
            "Grade how relevant the provided text context is for answering the user query."
        }
    }
}

/// System prompt for one metric
pub fn system_prompt(metric: Metric) -> String {
    format!(
        "You are an impartial evaluator of a retrieval-augmented generation system.\n\
         Metric: {}\n{}\nUse an integer grade from {} (worst) to {} (best).\n{}",
        metric.name(),
        instruction(metric),
        GRADE_SCALE.0,
        GRADE_SCALE.1,
        RESPONSE_FORMAT
    )
}

/// Build the chat messages grading `metric` for `request`.
///
/// Image metrics only see the image and text metrics only the text context;
/// answer metrics see whatever the example has.
pub fn build_messages(metric: Metric, request: &EvaluationRequest<'_>) -> Vec<Message> {
    let include_text = matches!(metric.modality(), None | Some(Modality::Text));
    let include_image = matches!(metric.modality(), None | Some(Modality::Image));

    let mut text = format!("User query:\n{}\n", request.query);
    if metric == Metric::AnswerCorrectness {
        text.push_str(&format!("\nReference answer:\n{}\n", request.reference_answer));
    }
    text.push_str(&format!("\nGenerated answer:\n{}\n", request.generated_answer));
    if let Some(context) = request.context.filter(|_| include_text) {
        text.push_str(&format!("\nText context:\n{}\n", context));
    }

    let mut parts = vec![ContentPart::text(text)];
    if let Some(image) = request.image.filter(|_| include_image) {
        parts.push(ContentPart::text("Image context:"));
        parts.push(ContentPart::image(image));
    }

    vec![Message::system(system_prompt(metric)), Message::user(parts)]
}
