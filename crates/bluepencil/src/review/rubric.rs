//! The fixed evaluation rubric sent with every analysis request.

use crate::review::ReviewRequest;

/// Hook categories a press release can lean on to earn media pickup.
pub const MEDIA_HOOKS: [&str; 9] = [
    "seasonality",
    "imagery",
    "conflict/contrast",
    "regionality",
    "topicality",
    "public interest",
    "novelty",
    "superlative/rarity",
    "surprise",
];

/// Emotional responses the content should aim to trigger in readers.
pub const TARGET_EMOTIONS: [&str; 6] = [
    "empathy",
    "excitement",
    "curiosity",
    "trust",
    "urgency",
    "delight",
];

/// Build the single user prompt for one draft: the evaluation criteria, the
/// output-shape instruction, and the draft itself. When a staged image URL is
/// present the image criteria and the `image` output object are required too.
pub fn build_rubric(request: &ReviewRequest, staged_image_url: Option<&str>) -> String {
    let mut sections = Vec::new();

    sections.push(
        "You are an experienced press-release editor. Review the draft below.\n\
         A good title is specific and concrete, leads with the newsworthy fact, and stays \
         within roughly 30 characters of meaningful content. A good lead paragraph answers \
         who/what/when/where/why/how and how much in two or three sentences. A good body \
         backs the announcement with background, evidence, and quotes, in descending order \
         of importance. Judge length appropriateness yourself; nothing has been validated \
         upstream."
            .to_string(),
    );

    sections.push(format!(
        "Evaluate the title and lead against these media hooks: {}.",
        MEDIA_HOOKS.join(", ")
    ));

    sections.push(format!(
        "Judge whether the content triggers any of these reader responses: {}.",
        TARGET_EMOTIONS.join(", ")
    ));

    if let Some(url) = staged_image_url {
        sections.push(format!(
            "A main image is attached at {url}. Evaluate it for resolution, composition, \
             text legibility, and usability as press material."
        ));
    }

    sections.push(
        "Respond with ONLY a JSON object, no surrounding prose and no code fences, \
         in exactly this shape:\n\
         {\"title\": {\"good\": string, \"improvement\": string, \"suggestion\": string},\n\
         \"lead\": {\"good\": string, \"improvement\": string, \"suggestion\": string},\n\
         \"body\": {\"good\": string, \"improvement\": string, \"suggestion\": string}}"
            .to_string(),
    );

    if let Some(url) = staged_image_url {
        sections.push(format!(
            "Additionally include an \"image\" key: {{\"good\": string, \"improvement\": \
             string, \"suggestion\": string, \"url\": \"{url}\"}} with the URL copied \
             verbatim."
        ));
    }

    sections.push(format!(
        "--- TITLE ---\n{}\n--- LEAD PARAGRAPH ---\n{}\n--- BODY ---\n{}",
        request.title, request.lead_paragraph, request.body
    ));

    sections.join("\n\n")
}
