#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::IntoEnumIterator;

/// The fixed crew of simulated agents. Serialized names are the exact strings
/// the model is instructed to emit.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
pub enum AgentName {
    #[serde(rename = "UI/UX Agent")]
    #[strum(to_string = "UI/UX Agent")]
    UiUx,
    #[serde(rename = "Frontend Agent")]
    #[strum(to_string = "Frontend Agent")]
    Frontend,
    #[serde(rename = "Backend Agent")]
    #[strum(to_string = "Backend Agent")]
    Backend,
    #[serde(rename = "Testing Agent")]
    #[strum(to_string = "Testing Agent")]
    Testing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Working,
    Complete,
    Error,
}

/// Latest known status of one agent. This is also the payload of an
/// `[AGENT_UPDATE]` line on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProgress {
    pub agent_name: AgentName,
    pub status: AgentStatus,
    pub message: String,
}

impl AgentProgress {
    pub fn new(agent_name: AgentName, status: AgentStatus, message: &str) -> AgentProgress {
        return AgentProgress {
            agent_name,
            status,
            message: message.to_string(),
        };
    }

    pub fn pending(agent_name: AgentName) -> AgentProgress {
        return AgentProgress::new(agent_name, AgentStatus::Pending, "Waiting...");
    }
}

pub struct CrewAgent {
    pub name: AgentName,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentName {
    pub fn profile(&self) -> CrewAgent {
        match self {
            AgentName::UiUx => return CrewAgent {
                name: *self,
                role: "Senior UI/UX Designer",
                goal: "Design breathtaking, intuitive, and accessible user interfaces that are modern, visually stunning, and provide a seamless user experience.",
                backstory: "A world-class designer with a portfolio featured in major design publications. You specialize in creating human-centric interfaces that are not only beautiful but also incredibly intuitive and accessible to all users.",
            },
            AgentName::Frontend => return CrewAgent {
                name: *self,
                role: "Lead Frontend Engineer",
                goal: "Build responsive, interactive, and performant applications using modern frontend technologies.",
                backstory: "A master of the frontend, specializing in writing clean, efficient, and maintainable code. You have a passion for pixel-perfect implementation and fluid animations.",
            },
            AgentName::Backend => return CrewAgent {
                name: *self,
                role: "Principal Backend Engineer",
                goal: "Create robust, scalable, and secure APIs and backend logic to power the application.",
                backstory: "An expert in server-side architecture, you excel at building resilient systems that can handle high traffic. Your focus is on performance, security, and scalability.",
            },
            AgentName::Testing => return CrewAgent {
                name: *self,
                role: "QA Automation Lead",
                goal: "Ensure the final code is high-quality, functional, bug-free, and ready for production.",
                backstory: "A meticulous and detail-oriented engineer who lives to find and squash bugs. You are an expert in automated testing and quality assurance, ensuring every application is flawless.",
            },
        }
    }

    /// Agents in the order they are expected to report.
    pub fn crew() -> Vec<AgentName> {
        return AgentName::iter().collect();
    }
}

/// Who is on the crew, as shown by `/help`.
pub fn crew_text() -> String {
    return AgentName::iter()
        .map(|name| {
            let agent = name.profile();
            return format!("- {} ({}): {}", agent.name, agent.role, agent.backstory);
        })
        .collect::<Vec<String>>()
        .join("\n");
}

/// Instruction sent alongside every prompt. It describes the crew and the
/// exact wire format the stream demuxer understands.
pub fn system_instruction() -> String {
    let agent_descriptions = AgentName::iter()
        .map(|name| {
            let agent = name.profile();
            return format!("- **{} ({})**: {}", agent.name, agent.role, agent.goal);
        })
        .collect::<Vec<String>>()
        .join("\n");

    let order = AgentName::iter()
        .map(|name| return name.to_string())
        .collect::<Vec<String>>()
        .join(" -> ");

    return format!(
        r#"You are an elite AI application builder, leading a team of specialized AI agents. Your mission is to generate a complete, production-ready, single-file full-stack application based on a user's request. The final product must be visually stunning, modern, and highly functional.

Follow this exact process:
1.  **Orchestration Phase**: Acknowledge the user's request and simulate the agent orchestration process. For each agent, output a status update on a new line.
    -   The format for agent updates MUST be: `[AGENT_UPDATE]{{"agentName": "AGENT_NAME", "status": "STATUS", "message": "MESSAGE"}}`
    -   STATUS must be 'working' or 'complete'.
    -   **Provide descriptive, engaging messages.** For example: "Crafting a stunning visual blueprint and intuitive user journey..." or "Assembling responsive UI components with clean, modern code."
    -   The agent execution order is strict: {order}.

2.  **Code Generation Phase**: After all agents report 'complete', you will generate the code.
    -   Start the code block with `[CODE_START]`.
    -   Generate a single, self-contained HTML file.
    -   Use vanilla HTML, CSS, and JavaScript. Embed CSS in a `<style>` tag and JS in a `<script>` tag.
    -   **Use Tailwind CSS via CDN for styling.** Create a premium, modern, and visually appealing design with excellent typography and responsive layouts.
    -   The application must be fully functional and interactive.
    -   Do NOT use any external JavaScript libraries or frameworks (like React, Vue, etc.) in the generated code itself.
    -   End the code block with `[CODE_END]`.

Do not add any other text, conversational filler, or explanations outside of the specified format. The output must be a clean stream of agent updates followed by the code block.

Here is your expert team:
{agent_descriptions}
"#
    );
}
