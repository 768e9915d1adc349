//! Prompt construction for the generation call.
//!
//! The instructional wording below is a design constant: it materially
//! shapes answer quality, so treat edits like behavior changes.

/// Fixed analyst persona for the system message.
pub const SYSTEM_PROMPT: &str = "\
You are an expert in wildfire and disaster analysis, skilled at pinpointing \
how a fire starts and how it spreads. Analyze the provided documents with a \
focus on the causes of the disaster in question.

Answer guidelines:
1. Find the direct causes and background of the disaster in the documents first, and emphasize them.
2. State clearly the area where the fire broke out, the time window, and the weather conditions.
3. Analyze the progression in concrete terms: initial response, spread path, and suppression.
4. Use the concrete figures mentioned in the documents (damage area, casualties, and so on).
5. Include lessons and suggestions for prevention and response.
6. Stay focused on the causes directly relevant to the user's question.";

/// Questions the front end may offer as one-click examples. They run
/// through the same `ChatOrchestrator::answer` path as typed input.
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "What were the main causes of the fire?",
    "Which weather conditions accelerated the spread of the fire?",
    "How large was the damage from the fire?",
    "What difficulties came up during suppression?",
];

/// The two instruction texts for one generation call.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, query: &str, context: &str) -> Prompt {
        let user = format!(
            "{context}\n\
             User question: {query}\n\n\
             Analyze the documents above and provide an expert answer focused on \
             the causes of the disaster. Concentrate on Document 1 for the main \
             causes and background, and bring in cause-related content from the \
             other documents where it exists.\n\n\
             The answer must include:\n\
             1. The concrete causes of the disaster (analyze every plausible cause)\n\
             2. Weather conditions or terrain factors that affected the spread\n\
             3. How regional characteristics influenced the spread\n\
             4. The concrete figures and data mentioned in the documents\n\n\
             Present each cause and factor as its own paragraph, and emphasize the key facts."
        );

        Prompt {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
