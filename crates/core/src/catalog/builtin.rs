//! The built-in stage catalog and its prompt builders.

use ap_protocol::stage_models::StageDefinition;

/// Builds the full instruction text for a stage from the user's request.
pub type PromptBuilder = fn(&str) -> String;

/// One built-in stage: name, description, prompt builder.
pub(crate) struct BuiltinStage {
    pub name: &'static str,
    pub description: &'static str,
    pub build: PromptBuilder,
}

impl BuiltinStage {
    pub(crate) fn definition(&self) -> StageDefinition {
        StageDefinition::new(self.name, self.description)
    }
}

pub(crate) const BUILTIN_STAGES: &[BuiltinStage] = &[
    BuiltinStage {
        name: "Architect",
        description: "Creates the technical plan and structure.",
        build: architect,
    },
    BuiltinStage {
        name: "UI/UX Designer",
        description: "Designs wireframes and user flows.",
        build: designer,
    },
    BuiltinStage {
        name: "Code Generator",
        description: "Writes the HTML, CSS, and JavaScript.",
        build: code_generator,
    },
    BuiltinStage {
        name: "Debugger & Optimizer",
        description: "Finds bugs and improves performance.",
        build: debugger,
    },
    BuiltinStage {
        name: "Creative Enhancer",
        description: "Adds creative flair and micro-interactions.",
        build: creative_enhancer,
    },
    BuiltinStage {
        name: "Documentation Writer",
        description: "Writes clear, user-facing documentation.",
        build: documentation_writer,
    },
    BuiltinStage {
        name: "Integration Specialist",
        description: "Checks for API and third-party needs.",
        build: integration_specialist,
    },
];

fn architect(request: &str) -> String {
    format!(
        "As the 'Architect' AI agent, your role is to create a high-level technical plan. \
         Based on the user request \"{request}\", outline the main components, data structures, \
         and overall architecture. Be concise and use bullet points."
    )
}

fn designer(request: &str) -> String {
    format!(
        "As the 'UI/UX Designer' AI agent, your role is to define the user experience. \
         For the user request \"{request}\", describe the key UI elements, user flow, and \
         interaction design principles. Focus on usability and aesthetics."
    )
}

fn code_generator(request: &str) -> String {
    format!(
        "As the 'Code Generator' AI agent, your task is to write a complete, runnable HTML file. \
         The output must be a single file that starts with <!DOCTYPE html> and includes <html>, \
         <head>, and <body> tags. It must use Tailwind CSS for styling by including the official \
         Tailwind CDN script in the <head>. Any necessary JavaScript should be included in a \
         <script> tag within the body. The code should be clean, responsive, and directly \
         implement the visual aspects of the user request: \"{request}\". Do not include any \
         explanations, comments, or markdown formatting like ```html. Output only the raw HTML code."
    )
}

fn debugger(request: &str) -> String {
    format!(
        "As the 'Debugger & Optimizer' AI agent, your job is to anticipate problems. For a \
         component based on \"{request}\", list 3 potential bugs, 2 performance bottlenecks, \
         and 1 accessibility issue to watch out for."
    )
}

fn creative_enhancer(request: &str) -> String {
    format!(
        "As the 'Creative Enhancer' AI agent, your goal is to add flair. Suggest three innovative \
         or delightful micro-interactions or visual effects that could enhance a web component \
         for \"{request}\"."
    )
}

fn documentation_writer(request: &str) -> String {
    format!(
        "As the 'Documentation Writer' AI agent, your task is to create clear documentation. \
         Write a brief, user-friendly description for a website component that fulfills this \
         request: \"{request}\". Explain its purpose and primary features."
    )
}

fn integration_specialist(request: &str) -> String {
    format!(
        "As the 'Integration Specialist' AI agent, you must identify external needs. For the \
         request \"{request}\", list potential third-party APIs, services, or libraries that \
         would be necessary or beneficial for implementation."
    )
}
