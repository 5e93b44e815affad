//! Rex, the conversational assistant.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    llm::TextModel,
    models::{Plan, Profile},
    planner::PlanSource,
    review::{Approval, PlanReview},
    storage::ActivePlan,
};

pub const GREETING: &str = "Hi! I'm Rex, your AI fitness assistant! 🏋️ I'm here to help you with \
your workouts, answer questions about your training plan, and provide guidance on your fitness \
journey. What can I help you with today?";

pub const FALLBACK_REPLY: &str = "I'm having some technical difficulties right now, but I'm here \
to help! Could you try asking your question again?";

const MODIFIED_REPLY: &str = "I've created a modified workout plan based on your request! Please \
review the changes and let me know if you'd like to approve them. 💪";

const UNMODIFIED_REPLY: &str =
    "I had trouble modifying your plan. Could you try rephrasing your request?";

const MODIFY_KEYWORDS: [&str; 6] = ["modify", "change", "adjust", "update", "alter", "customize"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Rex,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// What Rex knows about the user when answering.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub user_data: Option<Profile>,
    pub workout_plan: Option<Plan>,
    pub is_workout_mode: bool,
    pub current_exercise: Option<String>,
}

/// True when the text asks for a plan change ("can you adjust my plan?").
pub fn is_modify_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("plan") && MODIFY_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub struct RexChat {
    model: Arc<dyn TextModel>,
    source: Arc<dyn PlanSource>,
    messages: Vec<Message>,
    pending: Option<PlanReview>,
}

impl RexChat {
    pub fn new(model: Arc<dyn TextModel>, source: Arc<dyn PlanSource>) -> Self {
        Self {
            model,
            source,
            messages: vec![Message::new(Sender::Rex, GREETING)],
            pending: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Modified plan awaiting approve/reject.
    pub fn pending(&self) -> Option<&Plan> {
        self.pending.as_ref().map(PlanReview::plan)
    }

    /// Sends one user message and returns Rex's reply. Blank input is ignored.
    pub async fn send(&mut self, text: &str, ctx: &ChatContext) -> Option<&Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(Message::new(Sender::User, text));

        let reply = match &ctx.workout_plan {
            Some(plan) if is_modify_request(text) => self.propose(plan, text).await,
            _ => self.answer(text, ctx).await,
        };

        self.messages.push(Message::new(Sender::Rex, reply));
        self.messages.last()
    }

    pub fn approve(&mut self, active: &ActivePlan) -> Option<Approval> {
        self.pending.take().map(|review| review.approve(active))
    }

    pub fn reject(&mut self) -> bool {
        match self.pending.take() {
            Some(review) => {
                review.reject();
                true
            }
            None => false,
        }
    }

    async fn propose(&mut self, plan: &Plan, text: &str) -> String {
        let adapted = self.source.adapt(plan, text).await;
        if adapted == *plan {
            return UNMODIFIED_REPLY.to_string();
        }
        self.pending = Some(PlanReview::new(adapted));
        MODIFIED_REPLY.to_string()
    }

    async fn answer(&self, text: &str, ctx: &ChatContext) -> String {
        match self.model.complete(&rex_prompt(text, ctx)).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "rex reply failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

fn rex_prompt(question: &str, ctx: &ChatContext) -> String {
    let now = Local::now();
    let context = serde_json::json!({
        "userData": ctx.user_data,
        "workoutPlan": ctx.workout_plan,
        "isWorkoutMode": ctx.is_workout_mode,
        "currentExercise": ctx.current_exercise.clone().unwrap_or_default(),
        "currentDate": now.format("%Y-%m-%d").to_string(),
        "dayOfWeek": now.format("%A").to_string(),
    });
    let context = serde_json::to_string_pretty(&context).unwrap_or_default();

    let mode = if ctx.is_workout_mode {
        "Workout Session"
    } else {
        "General Assistance"
    };
    let exercise_line = ctx
        .current_exercise
        .as_deref()
        .map(|e| format!("Current Exercise: {e}\n"))
        .unwrap_or_default();

    format!(
        r#"You are Rex, an AI fitness assistant and personal trainer. You are helpful, motivational, and knowledgeable about fitness, nutrition, and health. Always respond in a friendly, encouraging tone with appropriate emojis.

User Context:
{context}

Current Mode: {mode}
{exercise_line}
User Question: "{question}"

Instructions:
1. If asked about today's workout, check the workout plan for the current day
2. If asked about injuries or pain, provide general advice but recommend consulting a healthcare professional
3. If in workout mode, focus on exercise-specific guidance, form tips, and motivation
4. Use the user's data to personalize responses (goals, current lifts, etc.)
5. Be encouraging and motivational
6. Keep responses concise but helpful (2-3 sentences max unless detailed explanation needed)
7. If you don't have specific information, be honest but still helpful
8. If the user wants to modify their workout plan, tell them to use phrases like "modify my plan" or "change my workout"

Respond as Rex:"#
    )
}
