//! 重试/兜底状态机，纯函数，不做任何 I/O

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// 第 i 次主尝试（从 0 开始）
    Attempting(u32),
    FallbackAttempting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Validated,
    Rejected,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }
}

pub fn initial_state(max_retries: u32) -> PipelineState {
    if max_retries == 0 {
        PipelineState::FallbackAttempting
    } else {
        PipelineState::Attempting(0)
    }
}

/// 状态转移。终态保持不变。
pub fn transition(state: PipelineState, outcome: AttemptOutcome, max_retries: u32) -> PipelineState {
    match (state, outcome) {
        (PipelineState::Attempting(_), AttemptOutcome::Validated)
        | (PipelineState::FallbackAttempting, AttemptOutcome::Validated) => PipelineState::Succeeded,
        (PipelineState::Attempting(i), AttemptOutcome::Rejected) => {
            if i + 1 < max_retries {
                PipelineState::Attempting(i + 1)
            } else {
                PipelineState::FallbackAttempting
            }
        }
        (PipelineState::FallbackAttempting, AttemptOutcome::Rejected) => PipelineState::Failed,
        (terminal, _) => terminal,
    }
}
