//! Prompt builders, one per generation role.

use crate::brief::BriefContext;
use crate::templates::TextualTemplate;
use crate::types::{PostFormat, SlideSpec};

use super::generator::{Prompt, Task};
use super::Article;

/// Prior output and gate notes handed back on a retry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub previous_output: String,
    pub notes: String,
}

fn with_feedback(mut user: String, feedback: Option<&Feedback>) -> String {
    if let Some(fb) = feedback {
        user.push_str("\n\nYour previous answer was rejected.\n");
        if !fb.previous_output.is_empty() {
            user.push_str("Previous answer:\n");
            user.push_str(&fb.previous_output);
            user.push('\n');
        }
        user.push_str("Problems to fix:\n");
        user.push_str(&fb.notes);
    }
    user
}

const JSON_ONLY: &str = "Answer with a single JSON document and nothing else.";

pub fn ideation(article: &Article, min_ideas: usize, feedback: Option<&Feedback>) -> Prompt {
    let user = format!(
        "Article title: {}\n\nArticle:\n{}\n\n\
         Summarise the article and propose at least {} distinct post ideas.\n\
         Return {{\"article_summary\": {{\"title\", \"key_points\", \"insights\": [{{\"id\", \"text\", \"source\"}}], \
         \"main_themes\", \"keywords\"}}, \"ideas\": [{{\"id\", \"platform\", \"format\", \"tone\", \"persona\", \
         \"angle\", \"hook\", \"narrative_arc\", \"insight_ids\", \"estimated_slides\", \"confidence\"}}]}}.\n\
         Every idea needs its own angle and hook.",
        article.title, article.text, min_ideas
    );
    Prompt {
        task: Task::Ideas,
        slide_number: None,
        system: format!("You are a social media strategist. {}", JSON_ONLY),
        user: with_feedback(user, feedback),
    }
}

pub fn narrative(
    context: &BriefContext,
    format: PostFormat,
    min_slides: usize,
    feedback: Option<&Feedback>,
) -> Prompt {
    let shape = match format {
        PostFormat::SingleImage => "exactly 1 slide".to_string(),
        PostFormat::Carousel => format!("at least {} slides", min_slides),
    };
    let user = format!(
        "Brief:\n{}\n\n\
         Plan a post with {}, numbered from 1.\n\
         Return {{\"pacing\": \"fast|moderate|deliberate\", \"transition_style\": \"abrupt|smooth|dramatic\", \
         \"slides\": [{{\"slide_number\", \"template_type\": \"hook|value|cta|transition\", \
         \"value_subtype\": \"data|insight|solution|example\" (value slides only), \"purpose\", \
         \"copy_direction\", \"key_elements\", \"content_slots\": {{\"slot\": max_chars}}}}]}}.",
        context.to_prompt_json(),
        shape
    );
    Prompt {
        task: Task::Narrative,
        slide_number: None,
        system: format!("You are a narrative architect for social carousels. {}", JSON_ONLY),
        user: with_feedback(user, feedback),
    }
}

pub fn slide_copy(
    context: &BriefContext,
    slide: &SlideSpec,
    template: Option<&TextualTemplate>,
    feedback: Option<&Feedback>,
) -> Prompt {
    let template_text = match template {
        Some(t) => format!(
            "Template {} ({}): {}\nStructure: {}\nExample: {}",
            t.id, t.module_type, t.function, t.structure, t.example
        ),
        None => "No template; follow the copy direction.".to_string(),
    };
    let slots: Vec<String> = slide
        .content_slots
        .iter()
        .map(|(name, max)| format!("\"{}\" (max {} chars)", name, max))
        .collect();
    let user = format!(
        "Brief:\n{}\n\nSlide {}: {}\nCopy direction: {}\nKey elements: {}\n{}\n\n\
         Fill these slots: {}.\nReturn {{\"slots\": {{\"slot\": \"text\"}}}}.",
        context.to_prompt_json(),
        slide.slide_number,
        slide.purpose,
        slide.copy_direction,
        slide.key_elements.join(", "),
        template_text,
        slots.join(", ")
    );
    Prompt {
        task: Task::SlideCopy,
        slide_number: Some(slide.slide_number),
        system: format!("You are a copywriter. {}", JSON_ONLY),
        user: with_feedback(user, feedback),
    }
}

pub fn slide_visual(context: &BriefContext, slide: &SlideSpec, feedback: Option<&Feedback>) -> Prompt {
    let user = format!(
        "Brief:\n{}\n\nSlide {}: {}\n\n\
         Describe the image only. Do not include any copy, headline or caption text.\n\
         Return {{\"description\", \"layout\", \"palette\": [], \"mood\", \"elements\": []}}.",
        context.to_prompt_json(),
        slide.slide_number,
        slide.purpose
    );
    Prompt {
        task: Task::SlideVisual,
        slide_number: Some(slide.slide_number),
        system: format!("You are a visual composer. {}", JSON_ONLY),
        user: with_feedback(user, feedback),
    }
}

pub fn caption(
    context: &BriefContext,
    slide_text: &str,
    max_chars: usize,
    feedback: Option<&Feedback>,
) -> Prompt {
    let user = format!(
        "Brief:\n{}\n\nSlides:\n{}\n\n\
         Write the post caption in at most {} characters including hashtags.\n\
         Return {{\"text\", \"hashtags\": []}}.",
        context.to_prompt_json(),
        slide_text,
        max_chars
    );
    Prompt {
        task: Task::Caption,
        slide_number: None,
        system: format!("You are a caption writer. {}", JSON_ONLY),
        user: with_feedback(user, feedback),
    }
}
