//! Prompt construction for study material generation.
//!
//! All prompts are optimized for the Gemini API: direct imperative
//! instructions, explicit output format blocks, and strict JSON-only output
//! requirements to discourage code-fence wrapping. Few-shot examples carry
//! explicit INPUT/OUTPUT labels.

pub const SYSTEM_PROMPT: &str = r#"You are an expert study assistant and educational content creator.

Your task is to help students learn effectively by creating two types of study materials:

RULES:
- Use only information in the notes
- Do not invent facts
- Keep language simple and student-friendly

1. SUMMARY GENERATION:
   - Extract the most important concepts from the notes
   - Create 3-7 clear, memorable bullet points
   - Each point should be 1-2 sentences long
   - Focus on core concepts, key relationships, and important details
   - Use simple, direct language

2. QUIZ GENERATION:
   - Create 3-5 multiple-choice questions
   - Test understanding, not just memorization
   - Each question should have exactly 4 options
   - Make questions clear and unambiguous
   - Ensure incorrect options are plausible but clearly wrong
   - Avoid trick questions or overly complex wording
   - Match difficulty to the source material

IMPORTANT: You must respond with ONLY valid JSON. No explanations, no markdown formatting, no code blocks - just pure JSON."#;

pub const OUTPUT_FORMAT: &str = r#"Output format - follow exactly:

{
    "summary": ["point 1", "point 2", "point 3"],
    "quiz": [
        {
            "question": "Question text?",
            "options": ["A", "B", "C", "D"],
            "answer": "A"
        }
    ]
}

Rules:
- Output ONLY the JSON object above
- Do NOT include markdown, code blocks, or any text outside the JSON
- Do NOT include ```json or ``` markers
- "summary" must be an array of 3-7 strings
- "quiz" must be an array of 3-5 question objects
- Each question must have exactly 4 options
- "answer" must be one of the 4 options provided"#;

pub const EXAMPLES: &str = r#"Here are examples of correct output format:

--- EXAMPLE 1 ---

INPUT NOTES:
"Photosynthesis is the process by which plants convert sunlight into energy. It occurs in chloroplasts and requires carbon dioxide and water. The outputs are glucose and oxygen."

CORRECT OUTPUT:
{
    "summary": [
        "Photosynthesis converts sunlight into chemical energy (glucose) in plant cells",
        "Occurs in chloroplasts and requires CO₂ and H₂O as inputs",
        "Produces glucose for plant energy and oxygen as a byproduct"
    ],
    "quiz": [
        {
            "question": "Where does photosynthesis take place in plant cells?",
            "options": ["Mitochondria", "Chloroplasts", "Nucleus", "Cell wall"],
            "answer": "Chloroplasts"
        },
        {
            "question": "Which of the following is a product of photosynthesis?",
            "options": ["Carbon dioxide", "Water", "Oxygen", "Nitrogen"],
            "answer": "Oxygen"
        },
        {
            "question": "What is the primary energy source for photosynthesis?",
            "options": ["Heat", "Sunlight", "Chemical energy", "Wind"],
            "answer": "Sunlight"
        }
    ]
}

--- EXAMPLE 2 ---

INPUT NOTES:
"The water cycle includes evaporation, condensation, and precipitation. Water evaporates from oceans and lakes, forms clouds through condensation, and returns to Earth as rain or snow."

CORRECT OUTPUT:
{
    "summary": [
        "The water cycle is a continuous process of water movement on Earth",
        "Evaporation occurs when water from oceans and lakes becomes water vapor",
        "Condensation forms clouds, and precipitation returns water to Earth's surface"
    ],
    "quiz": [
        {
            "question": "What happens during evaporation in the water cycle?",
            "options": ["Water falls as rain", "Water becomes vapor", "Clouds form", "Ice melts"],
            "answer": "Water becomes vapor"
        },
        {
            "question": "Which process forms clouds in the water cycle?",
            "options": ["Evaporation", "Precipitation", "Condensation", "Filtration"],
            "answer": "Condensation"
        },
        {
            "question": "What are the main forms of precipitation?",
            "options": ["Steam and vapor", "Rain and snow", "Clouds and fog", "Rivers and lakes"],
            "answer": "Rain and snow"
        }
    ]
}"#;

/// Build the complete study pack prompt: system prompt, few-shot examples,
/// the student's notes, and the output format block.
pub fn build_study_pack_prompt(notes: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n{EXAMPLES}\n\n--- YOUR TASK ---\n\nProcess these notes and generate study materials:\n\n{notes}\n\n{OUTPUT_FORMAT}"
    )
}

/// Build the prompt for a topic-tagged quiz: 5-10 questions, each labeled
/// with the topic from the notes it tests.
pub fn build_topic_quiz_prompt(notes: &str) -> String {
    format!(
        r#"{SYSTEM_PROMPT}

Generate a multiple-choice quiz from these notes:

{notes}

Output format - follow exactly:

{{
    "quiz": [
        {{
            "question": "Question text?",
            "options": ["A", "B", "C", "D"],
            "answer": "A",
            "topic": "Short topic label"
        }}
    ]
}}

Rules:
- Output ONLY the JSON object above
- Do NOT include markdown, code blocks, or any text outside the JSON
- Generate between 5 and 10 questions
- Each question must have exactly 4 options
- "answer" must be one of the 4 options provided, copied exactly
- "topic" must name the concept from the notes the question tests"#
    )
}

fn difficulty_instructions(difficulty: &str) -> &'static str {
    match difficulty {
        "easy" => {
            "\nDifficulty: EASY\n- Focus on basic recall and recognition\n- Use straightforward, simple language\n- Test fundamental concepts"
        }
        "hard" => {
            "\nDifficulty: HARD\n- Require synthesis and evaluation\n- Use complex scenarios\n- Test critical thinking and edge cases"
        }
        _ => {
            "\nDifficulty: MEDIUM\n- Test application and analysis\n- Include scenario-based questions\n- Require deeper understanding"
        }
    }
}

/// Build the flashcard prompt from either raw notes or a bare topic.
/// Always asks for exactly ten cards at the requested difficulty.
pub fn build_flashcard_prompt(text: Option<&str>, topic: Option<&str>, difficulty: &str) -> String {
    let source = match (text, topic) {
        (Some(notes), _) => format!("Create flashcards from these notes:\n\n{notes}"),
        (None, Some(topic)) => format!("Create flashcards about this topic: {topic}"),
        (None, None) => "Create flashcards from these notes:\n\n".to_string(),
    };

    format!(
        r#"You are an expert study assistant and educational content creator.
{}

{source}

Output format - follow exactly:

{{
    "flashcards": [
        {{
            "question": "Question text?",
            "answer": "Answer text."
        }}
    ]
}}

Rules:
- Output ONLY the JSON object above
- Do NOT include markdown, code blocks, or any text outside the JSON
- Generate exactly 10 flashcards
- Each flashcard must have a non-empty "question" and "answer"
- Keep answers concise: 1-3 sentences each"#,
        difficulty_instructions(difficulty)
    )
}
