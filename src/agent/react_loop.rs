//! ReAct conversation loop
//!
//! Drives the question -> (thought, action, observation)* -> final answer
//! cycle:
//! - Renders the system prompt once per run
//! - Calls the model with the full history each round
//! - Folds parse, validation and dispatch failures back in as observations
//! - Gates dangerous tools behind operator confirmation
//!
//! Every blocking point (model call, confirmation, operator input, tool
//! dispatch) is raced against the caller's cancellation token.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, AgentResult, LoopState};
use crate::gate::{
    self, Operator, REQUEST_USER_INPUT, REQUEST_USER_INPUT_DESCRIPTION,
    REQUEST_USER_INPUT_SIGNATURE,
};
use crate::helpers::Transcript;
use crate::llm::{ChatMessage, LlmProvider};
use crate::prompt::{render_system_prompt, PromptContext};
use crate::protocol::tags::{ACTION, FINAL_ANSWER, OBSERVATION, QUESTION, THOUGHT};
use crate::protocol::{extract_tag, parse_action, validate_action, wrap_tag, ActionCall};
use crate::tools::{ToolHandler, ToolRegistry};

use super::config::AgentConfig;
use super::executor::ToolExecutor;

/// ReAct agent bound to one model, one tool set and one operator
///
/// # Example
///
/// ```ignore
/// let tools = ToolRegistry::from_tools(default_tools(&project, &disql));
/// let mut agent = ReActAgent::new(config, llm, tools, Box::new(Console::new()), transcript);
/// let answer = agent.run("列出项目中的 Rust 文件", &CancellationToken::new()).await?;
/// ```
pub struct ReActAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    operator: Box<dyn Operator>,
    transcript: Arc<Transcript>,
    history: Vec<ChatMessage>,
    round: usize,
    state: LoopState,
}

impl ReActAgent {
    /// Create an agent; `request_user_input` is added unless already present
    pub fn new(
        config: AgentConfig,
        llm: Arc<dyn LlmProvider>,
        mut tools: ToolRegistry,
        operator: Box<dyn Operator>,
        transcript: Arc<Transcript>,
    ) -> Self {
        tools.ensure_operator_tool(
            REQUEST_USER_INPUT,
            REQUEST_USER_INPUT_SIGNATURE,
            REQUEST_USER_INPUT_DESCRIPTION,
        );

        tracing::info!(
            "[ReAct] Agent ready: model={} provider={} tools={:?}",
            config.model,
            llm.provider_name(),
            tools.tool_names()
        );

        Self {
            config,
            llm,
            tools,
            operator,
            transcript,
            history: Vec::new(),
            round: 0,
            state: LoopState::Idle,
        }
    }

    /// Answer `question`, looping until the model gives a final answer
    ///
    /// The history is reset at the start of every run. The round counter
    /// keeps increasing across runs.
    pub async fn run(&mut self, question: &str, cancel: &CancellationToken) -> AgentResult<String> {
        tracing::info!("[ReAct] Starting run");
        let result = self.run_rounds(question, cancel).await;

        match &result {
            Ok(_) => {
                tracing::info!("[ReAct] Final answer after round {}", self.round);
                self.state = LoopState::Final;
            }
            Err(e) => {
                tracing::warn!("[ReAct] Run failed in round {}: {}", self.round, e);
                self.state = LoopState::failed(e.to_string());
            }
        }
        result
    }

    async fn run_rounds(&mut self, question: &str, cancel: &CancellationToken) -> AgentResult<String> {
        let context = PromptContext::collect(&self.tools, &self.config.project_dir);
        let system_prompt = render_system_prompt(&self.config.prompt_template, &context);

        self.history = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(wrap_tag(QUESTION, question)),
        ];

        loop {
            self.round += 1;
            let round = self.round;
            self.transcript.start_round(round);
            self.transcript.record("模型", "正在请求模型，请稍候...");
            self.state = LoopState::AwaitingModel { round };

            let content = self.call_model(cancel).await?;
            self.history.push(ChatMessage::assistant(content.clone()));

            if let Some(thought) = extract_tag(&content, THOUGHT) {
                self.transcript.record("思考", &thought);
            }

            if let Some(answer) = extract_tag(&content, FINAL_ANSWER) {
                self.transcript.record("最终答案", &answer);
                return Ok(answer);
            }

            let payload = extract_tag(&content, ACTION).ok_or(AgentError::MissingAction)?;
            let observation = self.handle_action(&payload, cancel).await?;
            self.history
                .push(ChatMessage::user(wrap_tag(OBSERVATION, &observation)));
        }
    }

    async fn call_model(&self, cancel: &CancellationToken) -> AgentResult<String> {
        tracing::debug!(
            "[ReAct] Round {}: sending {} messages",
            self.round,
            self.history.len()
        );

        let content = until_cancelled(cancel, async {
            self.llm
                .complete(&self.config.model, &self.history)
                .await
                .map_err(AgentError::Transport)
        })
        .await?;

        if content.trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }
        Ok(content)
    }

    /// Turn one action payload into an observation
    async fn handle_action(&mut self, payload: &str, cancel: &CancellationToken) -> AgentResult<String> {
        let call = match parse_action(payload) {
            Ok(call) => call,
            Err(e) => {
                tracing::debug!("[ReAct] Unparseable action {:?}: {}", payload, e);
                self.transcript.record("解析失败", &e.to_string());
                return Ok(format!("action 解析失败: {}", e));
            }
        };

        if let Err(e) = validate_action(&call) {
            self.transcript.record("参数校验失败", &e.to_string());
            return Ok(format!("action 参数校验失败: {}", e));
        }

        self.transcript.record("动作", &call.to_string());

        if self.tools.requires_confirmation(&call.name) {
            self.state = LoopState::AwaitingOperator {
                tool_name: call.name.clone(),
            };
            let approved = until_cancelled(cancel, gate::confirm(&mut *self.operator)).await?;
            if !approved {
                tracing::info!("[ReAct] Operator declined {}", call.name);
                return Err(AgentError::Cancelled);
            }
        }

        let observation = self.dispatch(&call, cancel).await?;
        self.transcript.record("反馈", &observation);
        Ok(observation)
    }

    async fn dispatch(&mut self, call: &ActionCall, cancel: &CancellationToken) -> AgentResult<String> {
        self.state = match self.tools.get(&call.name).map(|entry| &entry.handler) {
            Some(ToolHandler::Operator) => LoopState::AwaitingOperator {
                tool_name: call.name.clone(),
            },
            _ => LoopState::Dispatching {
                tool_name: call.name.clone(),
            },
        };

        until_cancelled(
            cancel,
            ToolExecutor::execute(&self.tools, &mut *self.operator, &self.transcript, call),
        )
        .await
    }

    /// Messages of the current (or last) run, system prompt first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Current loop state
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Number of model calls made so far
    pub fn round(&self) -> usize {
        self.round
    }

    /// Registered tools, `request_user_input` included
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = AgentResult<T>>,
) -> AgentResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AgentError::Interrupted),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ScriptedOperator;
    use crate::helpers::SharedBuffer;
    use crate::llm::Role;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const TEMPLATE: &str = "工具:\n${tool_list}\n系统: ${operating_system}";

    /// Replays canned replies and records every request
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, _model: &str, messages: &[ChatMessage]) -> anyhow::Result<String> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    /// Tool that counts invocations
    struct CountingTool {
        name: &'static str,
        dangerous: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            self.name
        }

        fn signature(&self) -> &str {
            "(text string)"
        }

        fn description(&self) -> &str {
            "counts calls"
        }

        async fn execute(&self, args: &[String]) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match args.first().map(String::as_str) {
                Some("fail") => anyhow::bail!("boom"),
                Some(text) => Ok(format!("ran {}", text)),
                None => Ok("ran".to_string()),
            }
        }

        fn requires_confirmation(&self) -> bool {
            self.dangerous
        }
    }

    struct Harness {
        agent: ReActAgent,
        llm: Arc<ScriptedLlm>,
        calls: Arc<AtomicUsize>,
        log: SharedBuffer,
    }

    fn harness(replies: &[&str], answers: &[&str]) -> Harness {
        let llm = ScriptedLlm::new(replies);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut tools = ToolRegistry::new();
        tools.register(CountingTool {
            name: "count",
            dangerous: false,
            calls: calls.clone(),
        });
        tools.register(CountingTool {
            name: "run_terminal_command",
            dangerous: true,
            calls: calls.clone(),
        });

        let log = SharedBuffer::new();
        let agent = ReActAgent::new(
            AgentConfig::default().with_template(TEMPLATE),
            llm.clone(),
            tools,
            Box::new(ScriptedOperator::new(answers.iter().copied())),
            Arc::new(Transcript::with_writer(log.clone())),
        );

        Harness {
            agent,
            llm,
            calls,
            log,
        }
    }

    fn last_message(agent: &ReActAgent) -> &ChatMessage {
        agent.history().last().unwrap()
    }

    #[tokio::test]
    async fn test_final_answer_first_round() {
        let mut h = harness(&["<thought>T</thought><final_answer> A </final_answer>"], &[]);
        let answer = h.agent.run("问题", &CancellationToken::new()).await.unwrap();

        assert_eq!(answer, "A");
        assert_eq!(h.agent.round(), 1);
        assert_eq!(h.agent.state(), &LoopState::Final);
        assert_eq!(h.llm.calls(), 1);

        let history = h.agent.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1], ChatMessage::user("<question>问题</question>"));
        assert_eq!(history[2].role, Role::Assistant);

        let log = h.log.contents();
        assert!(log.contains("==== Round 1 ===="));
        assert!(log.contains("[思考]"));
        assert!(log.contains("[最终答案]"));
    }

    #[tokio::test]
    async fn test_system_prompt_lists_tools() {
        let mut h = harness(&["<final_answer>ok</final_answer>"], &[]);
        h.agent.run("q", &CancellationToken::new()).await.unwrap();

        let system = &h.agent.history()[0].content;
        assert!(system.contains("- count(text string): counts calls"));
        assert!(system.contains("- request_user_input(prompt string): "));
        assert!(!system.contains("${"));
        assert!(h.agent.tools().contains(REQUEST_USER_INPUT));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observed() {
        let mut h = harness(
            &[
                "<thought>try</thought><action>unknown_tool(\"x\")</action>",
                "<final_answer>done</final_answer>",
            ],
            &[],
        );
        let answer = h.agent.run("q", &CancellationToken::new()).await.unwrap();
        assert_eq!(answer, "done");
        assert_eq!(h.llm.calls(), 2);

        let history = h.agent.history();
        assert_eq!(
            history[3],
            ChatMessage::user("<observation>未知工具: unknown_tool</observation>")
        );
        // The second request carried the observation
        let requests = h.llm.requests.lock().unwrap();
        assert_eq!(requests[1].len(), 4);
    }

    #[tokio::test]
    async fn test_tool_result_and_failure_become_observations() {
        let mut h = harness(
            &[
                "<action>count(\"a\")</action>",
                "<action>count(\"fail\")</action>",
                "<final_answer>done</final_answer>",
            ],
            &[],
        );
        h.agent.run("q", &CancellationToken::new()).await.unwrap();

        let history = h.agent.history();
        assert_eq!(history[3].content, "<observation>ran a</observation>");
        assert_eq!(history[5].content, "<observation>工具执行错误: boom</observation>");
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
        assert!(h.log.contents().contains("count(a)"));
    }

    #[tokio::test]
    async fn test_declined_confirmation_aborts() {
        let mut h = harness(&["<action>run_terminal_command(\"rm -rf /\")</action>"], &["n"]);
        let err = h.agent.run("q", &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, AgentError::Cancelled));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(h.agent.state(), LoopState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_approved_confirmation_runs_tool() {
        let mut h = harness(
            &[
                "<action>run_terminal_command(\"ls\")</action>",
                "<final_answer>listed</final_answer>",
            ],
            &[" Y "],
        );
        let answer = h.agent.run("q", &CancellationToken::new()).await.unwrap();

        assert_eq!(answer, "listed");
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.agent.history()[3].content, "<observation>ran ls</observation>");
    }

    #[tokio::test]
    async fn test_parse_error_is_observed() {
        let mut h = harness(
            &[
                "<action>count(</action>",
                "<action>count(42)</action>",
                "<final_answer>ok</final_answer>",
            ],
            &[],
        );
        h.agent.run("q", &CancellationToken::new()).await.unwrap();

        let history = h.agent.history();
        assert!(history[3].content.starts_with("<observation>action 解析失败: "));
        assert!(history[5].content.contains("第 1 个参数必须是字符串"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(h.log.contents().contains("[解析失败]"));
    }

    #[tokio::test]
    async fn test_validation_error_is_observed() {
        let mut h = harness(
            &[
                "<action>query_database(\"your_dsn_here\", \"SELECT 1\")</action>",
                "<final_answer>ok</final_answer>",
            ],
            &[],
        );
        h.agent.run("q", &CancellationToken::new()).await.unwrap();

        let observation = &h.agent.history()[3].content;
        assert!(observation.starts_with("<observation>action 参数校验失败: "));
        assert!(observation.contains("request_user_input"));
        assert!(h.log.contents().contains("[参数校验失败]"));
    }

    #[tokio::test]
    async fn test_request_user_input_flow() {
        let mut h = harness(
            &[
                "<action>request_user_input(\"请提供 DSN\")</action>",
                "<final_answer>thanks</final_answer>",
            ],
            &["", "dm://SYSDBA:pw@localhost:5236"],
        );
        h.agent.run("q", &CancellationToken::new()).await.unwrap();

        assert_eq!(
            h.agent.history()[3].content,
            "<observation>dm://SYSDBA:pw@localhost:5236</observation>"
        );
        let log = h.log.contents();
        assert!(log.contains("[补充信息请求]"));
        assert!(log.contains("[用户补充信息]"));
    }

    #[tokio::test]
    async fn test_operator_eof_is_fatal() {
        let mut h = harness(&["<action>request_user_input(\"?\")</action>"], &[]);
        let err = h.agent.run("q", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::OperatorInput(_)));
    }

    #[tokio::test]
    async fn test_missing_action_keeps_reply() {
        let mut h = harness(&["<thought>hmm</thought> nothing to do"], &[]);
        let err = h.agent.run("q", &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, AgentError::MissingAction));
        assert_eq!(
            last_message(&h.agent),
            &ChatMessage::assistant("<thought>hmm</thought> nothing to do")
        );
    }

    #[tokio::test]
    async fn test_empty_reply_is_fatal() {
        let mut h = harness(&["  \n "], &[]);
        let err = h.agent.run("q", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse));
        assert_eq!(h.agent.history().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let mut h = harness(&[], &[]);
        let err = h.agent.run("q", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::Transport(_)));
    }

    #[tokio::test]
    async fn test_final_answer_wins_over_action() {
        let mut h = harness(
            &["<action>count(\"a\")</action><final_answer>both</final_answer>"],
            &[],
        );
        let answer = h.agent.run("q", &CancellationToken::new()).await.unwrap();
        assert_eq!(answer, "both");
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_interrupts() {
        let mut h = harness(&["<final_answer>never</final_answer>"], &[]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = h.agent.run("q", &cancel).await.unwrap_err();
        assert!(matches!(err, AgentError::Interrupted));
        assert_eq!(h.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_rounds_accumulate_and_history_resets() {
        let mut h = harness(
            &[
                "<action>count(\"a\")</action>",
                "<final_answer>one</final_answer>",
                "<final_answer>two</final_answer>",
            ],
            &[],
        );
        h.agent.run("first", &CancellationToken::new()).await.unwrap();
        assert_eq!(h.agent.round(), 2);

        h.agent.run("second", &CancellationToken::new()).await.unwrap();
        assert_eq!(h.agent.round(), 3);
        assert_eq!(h.agent.history().len(), 3);
        assert_eq!(h.agent.history()[1].content, "<question>second</question>");
    }
}
