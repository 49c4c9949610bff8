//! Display-math region tracking.
//!
//! A small state machine pairs `$$` delimiters and records the line span of
//! every display-math block. Blocks whose `$$` lines only wrap a named
//! equation environment lose the `$$` lines; the environment is kept.

use super::classify::{environment, is_display_math, is_single_line_display_math, DISPLAY_MATH};
use crate::model::MathRegion;

/// Tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum MathState {
    /// Not inside display math
    #[default]
    Outside,
    /// Inside a `$$ .. $$` block rendered as `\[ .. \]`
    InsideBareMath { start: usize },
    /// Inside an equation environment, with or without dropped `$$` lines
    InsideEnvironmentMath {
        start: usize,
        /// Opened by a `$$` line that was dropped
        wrapped: bool,
        /// `\begin` nesting depth
        depth: usize,
        /// Replacement name for an inner environment that lost its `$$`
        promote: Option<&'static str>,
    },
}

/// What to do with a line the tracker consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathAction {
    /// Leave the line as it is
    Keep,
    /// Replace the line
    Replace(String),
    /// Queue the line for deletion
    Delete,
}

/// Pairs display-math delimiters and records [`MathRegion`]s.
#[derive(Debug, Default)]
pub struct MathTracker {
    state: MathState,
    regions: Vec<MathRegion>,
}

impl MathTracker {
    /// Create a tracker in the `Outside` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the line at `index`.
    ///
    /// `next` is the next non-blank line, used to decide whether a `$$` line
    /// only wraps an environment. Returns `None` when the line is not part of
    /// display math and should be classified normally.
    pub fn step(&mut self, index: usize, line: &str, next: Option<&str>) -> Option<MathAction> {
        match self.state {
            MathState::Outside => self.step_outside(index, line, next),
            MathState::InsideBareMath { start } => {
                if is_display_math(line) {
                    self.close(start, index);
                    Some(MathAction::Replace(format!(
                        "\\]{}",
                        &line[DISPLAY_MATH.len()..]
                    )))
                } else {
                    Some(MathAction::Keep)
                }
            }
            MathState::InsideEnvironmentMath {
                start,
                wrapped,
                depth,
                promote,
            } => Some(self.step_environment(index, line, start, wrapped, depth, promote)),
        }
    }

    fn step_outside(&mut self, index: usize, line: &str, next: Option<&str>) -> Option<MathAction> {
        if is_display_math(line) {
            if is_single_line_display_math(line) {
                let trimmed = line.trim_end();
                let inner = &trimmed[DISPLAY_MATH.len()..trimmed.len() - DISPLAY_MATH.len()];
                self.regions.push(MathRegion::new(index, index));
                return Some(MathAction::Replace(format!("\\[{}\\]", inner)));
            }

            if let Some(tag) = next.and_then(environment).filter(|tag| tag.begin) {
                self.state = MathState::InsideEnvironmentMath {
                    start: index,
                    wrapped: true,
                    depth: 0,
                    promote: tag.promoted(),
                };
                return Some(MathAction::Delete);
            }

            self.state = MathState::InsideBareMath { start: index };
            return Some(MathAction::Replace(format!(
                "\\[{}",
                &line[DISPLAY_MATH.len()..]
            )));
        }

        match environment(line) {
            Some(tag) if tag.begin && tag.is_display() => {
                self.state = MathState::InsideEnvironmentMath {
                    start: index,
                    wrapped: false,
                    depth: 1,
                    promote: None,
                };
                Some(MathAction::Keep)
            }
            _ => None,
        }
    }

    fn step_environment(
        &mut self,
        index: usize,
        line: &str,
        start: usize,
        wrapped: bool,
        depth: usize,
        promote: Option<&'static str>,
    ) -> MathAction {
        if let Some(tag) = environment(line) {
            let name = tag.name;
            let depth = if tag.begin {
                depth + 1
            } else {
                depth.saturating_sub(1)
            };
            let outermost = (tag.begin && depth == 1) || (!tag.begin && depth == 0);

            let action = match promote {
                Some(promoted) if outermost && !tag.starred => {
                    let verb = if tag.begin { "begin" } else { "end" };
                    MathAction::Replace(line.replacen(
                        &format!("\\{}{{{}}}", verb, name),
                        &format!("\\{}{{{}}}", verb, promoted),
                        1,
                    ))
                }
                _ => MathAction::Keep,
            };

            if !wrapped && depth == 0 {
                self.close(start, index);
            } else {
                self.state = MathState::InsideEnvironmentMath {
                    start,
                    wrapped,
                    depth,
                    promote,
                };
            }
            return action;
        }

        if wrapped && is_display_math(line) {
            self.close(start, index);
            // text after the closing `$$` stays on the line
            let rest = line[DISPLAY_MATH.len()..].trim();
            if rest.is_empty() {
                return MathAction::Delete;
            }
            return MathAction::Replace(rest.to_string());
        }

        MathAction::Keep
    }

    fn close(&mut self, start: usize, end: usize) {
        self.regions.push(MathRegion::new(start, end));
        self.state = MathState::Outside;
    }

    /// Finish tracking.
    ///
    /// Returns the recorded regions, or the start index of the region that
    /// was never closed.
    pub fn finish(self) -> Result<Vec<MathRegion>, (usize, Vec<MathRegion>)> {
        match self.state {
            MathState::Outside => Ok(self.regions),
            MathState::InsideBareMath { start }
            | MathState::InsideEnvironmentMath { start, .. } => Err((start, self.regions)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the tracker over all lines, returning the actions and the
    /// finished tracker result.
    fn run(lines: &[&str]) -> (Vec<Option<MathAction>>, Result<Vec<MathRegion>, usize>) {
        let mut tracker = MathTracker::new();
        let mut actions = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let next = lines[i + 1..].iter().copied().find(|l| !l.trim().is_empty());
            actions.push(tracker.step(i, line, next));
        }
        let result = tracker.finish().map_err(|(start, _)| start);
        (actions, result)
    }

    #[test]
    fn test_bare_display_math() {
        let (actions, regions) = run(&["Text", "$$x^2 + y^2 = z^2", "$$", "More"]);
        assert_eq!(actions[0], None);
        assert_eq!(
            actions[1],
            Some(MathAction::Replace("\\[x^2 + y^2 = z^2".to_string()))
        );
        assert_eq!(actions[2], Some(MathAction::Replace("\\]".to_string())));
        assert_eq!(actions[3], None);
        assert_eq!(regions.unwrap(), vec![MathRegion::new(1, 2)]);
    }

    #[test]
    fn test_wrapped_environment_drops_delimiters() {
        let (actions, regions) = run(&[
            "$$",
            "\\begin{align}",
            "x &= y",
            "\\end{align}",
            "$$",
        ]);
        assert_eq!(actions[0], Some(MathAction::Delete));
        assert_eq!(actions[1], Some(MathAction::Keep));
        assert_eq!(actions[2], Some(MathAction::Keep));
        assert_eq!(actions[3], Some(MathAction::Keep));
        assert_eq!(actions[4], Some(MathAction::Delete));
        assert_eq!(regions.unwrap(), vec![MathRegion::new(0, 4)]);
    }

    #[test]
    fn test_wrapped_close_keeps_trailing_text() {
        let (actions, regions) = run(&[
            "$$",
            "\\begin{align}",
            "a &= b",
            "\\end{align}",
            "$$ .",
        ]);
        assert_eq!(actions[0], Some(MathAction::Delete));
        assert_eq!(actions[4], Some(MathAction::Replace(".".to_string())));
        assert_eq!(regions.unwrap(), vec![MathRegion::new(0, 4)]);
    }

    #[test]
    fn test_wrapped_inner_environment_is_promoted() {
        let (actions, _) = run(&["$$", "\\begin{aligned}", "a &= b", "\\end{aligned}", "$$"]);
        assert_eq!(
            actions[1],
            Some(MathAction::Replace("\\begin{align*}".to_string()))
        );
        assert_eq!(
            actions[3],
            Some(MathAction::Replace("\\end{align*}".to_string()))
        );
    }

    #[test]
    fn test_bare_environment_region() {
        let (actions, regions) = run(&["\\begin{equation}", "a & b", "\\end{equation}", "after"]);
        assert_eq!(actions[0], Some(MathAction::Keep));
        assert_eq!(actions[3], None);
        assert_eq!(regions.unwrap(), vec![MathRegion::new(0, 2)]);
    }

    #[test]
    fn test_nested_environment_depth() {
        let (_, regions) = run(&[
            "\\begin{equation}",
            "\\begin{split}",
            "a &= b",
            "\\end{split}",
            "\\end{equation}",
        ]);
        assert_eq!(regions.unwrap(), vec![MathRegion::new(0, 4)]);
    }

    #[test]
    fn test_single_line_display_math() {
        let (actions, regions) = run(&["$$E = mc^2$$"]);
        assert_eq!(
            actions[0],
            Some(MathAction::Replace("\\[E = mc^2\\]".to_string()))
        );
        assert_eq!(regions.unwrap(), vec![MathRegion::new(0, 0)]);
    }

    #[test]
    fn test_blank_line_before_environment_still_wraps() {
        let (actions, _) = run(&["$$", "", "\\begin{gather}", "a", "\\end{gather}", "$$"]);
        assert_eq!(actions[0], Some(MathAction::Delete));
        assert_eq!(actions[5], Some(MathAction::Delete));
    }

    #[test]
    fn test_unterminated_region_reported() {
        let (_, result) = run(&["Text", "$$", "x = 1", "More text"]);
        assert_eq!(result.unwrap_err(), 1);
    }

    #[test]
    fn test_alternation_over_many_blocks() {
        let (actions, regions) = run(&["$$", "a", "$$", "b", "$$", "c", "$$"]);
        let opens = actions
            .iter()
            .filter(|a| matches!(a, Some(MathAction::Replace(s)) if s.starts_with("\\[")))
            .count();
        let closes = actions
            .iter()
            .filter(|a| matches!(a, Some(MathAction::Replace(s)) if s.starts_with("\\]")))
            .count();
        assert_eq!(opens, 2);
        assert_eq!(closes, 2);
        assert_eq!(
            regions.unwrap(),
            vec![MathRegion::new(0, 2), MathRegion::new(4, 6)]
        );
    }
}
