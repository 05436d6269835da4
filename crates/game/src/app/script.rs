use engine::{InputAction, InputSnapshot, InputSource};

const WAIT: &str = "wait";

/// One script line: actions for `ticks` consecutive ticks. Movement is held for the whole
/// step; jump, dash and quit are pressed on its first tick only.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScriptStep {
    actions: Vec<InputAction>,
    ticks: u32,
}

impl ScriptStep {
    fn snapshot(&self, tick_in_step: u32) -> InputSnapshot {
        self.actions
            .iter()
            .filter(|action| tick_in_step == 0 || is_held(**action))
            .fold(InputSnapshot::empty(), |snapshot, action| {
                snapshot.with_action_down(*action, true)
            })
    }
}

fn is_held(action: InputAction) -> bool {
    matches!(action, InputAction::MoveLeft | InputAction::MoveRight)
}

/// Parses `<action>[+<action>...] [ticks]` lines. Blank lines and `#` comments are skipped.
pub(crate) fn parse_script(content: &str) -> Result<Vec<ScriptStep>, String> {
    let mut steps = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let action_list = parts.next().unwrap_or_default();
        let ticks = match parts.next() {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| format!("line {line_no}: invalid tick count '{raw}'"))?,
            None => 1,
        };
        if ticks == 0 {
            return Err(format!("line {line_no}: tick count must be at least 1"));
        }
        if let Some(extra) = parts.next() {
            return Err(format!("line {line_no}: unexpected argument '{extra}'"));
        }

        let mut actions = Vec::new();
        for name in action_list.split('+') {
            if name == WAIT {
                continue;
            }
            let action = InputAction::from_name(name)
                .ok_or_else(|| format!("line {line_no}: unknown action '{name}'"))?;
            actions.push(action);
        }
        steps.push(ScriptStep { actions, ticks });
    }
    Ok(steps)
}

#[derive(Debug, Clone)]
pub(crate) struct ScriptedInput {
    steps: Vec<ScriptStep>,
    step: usize,
    tick_in_step: u32,
}

impl ScriptedInput {
    pub(crate) fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            step: 0,
            tick_in_step: 0,
        }
    }

    pub(crate) fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.ticks)).sum()
    }
}

impl InputSource for ScriptedInput {
    fn next_tick(&mut self) -> Option<InputSnapshot> {
        let step = self.steps.get(self.step)?;
        let snapshot = step.snapshot(self.tick_in_step);
        self.tick_in_step += 1;
        if self.tick_in_step >= step.ticks {
            self.step += 1;
            self.tick_in_step = 0;
        }
        Some(snapshot)
    }
}

/// No input at all, forever. Used when no script is given.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct IdleInput;

impl InputSource for IdleInput {
    fn next_tick(&mut self) -> Option<InputSnapshot> {
        Some(InputSnapshot::empty())
    }
}
