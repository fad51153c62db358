//! Scenario runner.
//!
//! A scenario is an ordered, independently-titled sequence of steps, each
//! tagged arrange, act, or assert. The runner walks the steps in declared
//! order through the state machine
//! `Pending -> Arranging -> Acting -> Asserting -> {Passed | Failed}`:
//! any step error fails the scenario immediately, skips the remaining
//! steps, and still runs the teardown hook exactly once. One scenario runs
//! at a time; a failure never aborts the rest of the suite.
//!
//! Each scenario declares and establishes its own starting state in its
//! arrange steps; the runner deliberately offers no way to depend on where
//! a previous scenario left the UI.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span};

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::intercept::{InterceptRegistry, InterceptedExchange};
use crate::page::Page;
use crate::registry::SelectorRegistry;
use crate::result::{EscenarioError, EscenarioResult};
use crate::session::SessionStore;

/// Phase a step belongs to. Steps must be declared in non-decreasing
/// phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Establish the scenario's starting state
    Arrange,
    /// Drive the UI (including waits on intercept aliases)
    Act,
    /// Validate outcomes
    Assert,
}

impl Phase {
    /// Phase name as used in reports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Arrange => "arrange",
            Self::Act => "act",
            Self::Assert => "assert",
        }
    }
}

/// Execution state of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    /// Not started
    Pending,
    /// Running arrange steps / before-each hook
    Arranging,
    /// Running act steps
    Acting,
    /// Running assert steps
    Asserting,
    /// Every assertion held
    Passed,
    /// A step or hook errored
    Failed,
}

type StepFn = Box<dyn FnMut(&mut ScenarioContext) -> EscenarioResult<()>>;

/// One step of a scenario.
struct Step {
    phase: Phase,
    description: String,
    run: StepFn,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("phase", &self.phase)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Shared state a step acts on: the driver, the session store, the
/// intercept registry, and the suite configuration.
pub struct ScenarioContext {
    driver: Box<dyn Driver>,
    /// Session persistence across scenario boundaries
    pub session: SessionStore,
    /// Intercept alias registry
    pub intercepts: InterceptRegistry,
    /// Suite-wide configuration
    pub config: SuiteConfig,
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Create a context around a driver
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, config: SuiteConfig) -> Self {
        let intercepts = InterceptRegistry::new().with_default_timeout(config.intercept_timeout);
        Self {
            driver,
            session: SessionStore::new(),
            intercepts,
            config,
        }
    }

    /// The driver, for direct calls
    pub fn driver(&mut self) -> &mut dyn Driver {
        self.driver.as_mut()
    }

    /// The driver, read-only
    #[must_use]
    pub fn driver_ref(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Bind a selector registry into a [`Page`]
    pub fn page<'a>(&'a mut self, selectors: &'a SelectorRegistry) -> Page<'a> {
        Page::new(self.driver.as_mut(), selectors)
    }

    /// Navigate to a path under the configured base URL
    pub fn goto(&mut self, path: &str) -> EscenarioResult<()> {
        let url = self.config.url(path);
        self.driver.navigate(&url)
    }

    /// Save the live session into the store (wholesale replace)
    pub fn save_session(&mut self) -> EscenarioResult<()> {
        self.session.save(self.driver.as_ref())
    }

    /// Restore the stored session into the browser (no-op without one)
    pub fn restore_session(&mut self) -> EscenarioResult<()> {
        self.session.restore(self.driver.as_mut())
    }

    /// Block on an intercept alias with the suite's default window
    pub fn wait_for(&self, alias: &str) -> EscenarioResult<InterceptedExchange> {
        self.intercepts.wait(alias)
    }
}

/// An ordered, titled sequence of phased steps.
#[derive(Debug)]
pub struct Scenario {
    title: String,
    steps: Vec<Step>,
}

impl Scenario {
    /// Start building a scenario
    #[must_use]
    pub fn builder(title: impl Into<String>) -> ScenarioBuilder {
        ScenarioBuilder {
            title: title.into(),
            steps: Vec::new(),
        }
    }

    /// Scenario title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of declared steps
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Builder collecting phased steps for a [`Scenario`].
pub struct ScenarioBuilder {
    title: String,
    steps: Vec<Step>,
}

impl std::fmt::Debug for ScenarioBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioBuilder")
            .field("title", &self.title)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl ScenarioBuilder {
    fn step(
        mut self,
        phase: Phase,
        description: impl Into<String>,
        run: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.steps.push(Step {
            phase,
            description: description.into(),
            run: Box::new(run),
        });
        self
    }

    /// Add an arrange step
    #[must_use]
    pub fn arrange(
        self,
        description: impl Into<String>,
        run: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.step(Phase::Arrange, description, run)
    }

    /// Add an act step
    #[must_use]
    pub fn act(
        self,
        description: impl Into<String>,
        run: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.step(Phase::Act, description, run)
    }

    /// Add an act step that blocks on an intercept alias and discards the
    /// exchange. Register the alias in an arrange step first.
    #[must_use]
    pub fn wait_on(self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let description = format!("wait on intercept '{alias}'");
        self.step(Phase::Act, description, move |ctx| {
            ctx.wait_for(&alias).map(|_| ())
        })
    }

    /// Add an assert step
    #[must_use]
    pub fn assert(
        self,
        description: impl Into<String>,
        run: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.step(Phase::Assert, description, run)
    }

    /// Validate phase ordering and freeze the scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when a step's phase precedes an earlier
    /// step's phase (e.g. an arrange step declared after an act step).
    pub fn build(self) -> EscenarioResult<Scenario> {
        let mut previous = Phase::Arrange;
        for (index, step) in self.steps.iter().enumerate() {
            if step.phase < previous {
                return Err(EscenarioError::InvalidState {
                    message: format!(
                        "step {index} '{}' declares phase '{}' after phase '{}' in scenario '{}'",
                        step.description,
                        step.phase.as_str(),
                        previous.as_str(),
                        self.title
                    ),
                });
            }
            previous = step.phase;
        }
        Ok(Scenario {
            title: self.title,
            steps: self.steps,
        })
    }
}

/// Where and how a scenario failed.
#[derive(Debug)]
pub struct StepFailure {
    /// Index of the failing step; `None` for a lifecycle hook
    pub index: Option<usize>,
    /// Description of the failing step or hook
    pub description: String,
    /// The underlying error
    pub error: EscenarioError,
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "step {index} '{}': [{}] {}",
                self.description,
                self.error.kind(),
                self.error
            ),
            None => write!(
                f,
                "{}: [{}] {}",
                self.description,
                self.error.kind(),
                self.error
            ),
        }
    }
}

/// Outcome of one scenario.
#[derive(Debug)]
pub struct ScenarioReport {
    /// Scenario title
    pub title: String,
    /// Final state (`Passed` or `Failed`)
    pub state: ScenarioState,
    /// Failure detail when `Failed`
    pub failure: Option<StepFailure>,
    /// Steps that completed without error
    pub steps_run: usize,
    /// Steps the scenario declared
    pub steps_total: usize,
    /// Wall-clock duration
    pub duration: Duration,
}

impl ScenarioReport {
    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Outcome of a whole suite.
#[derive(Debug)]
pub struct SuiteReport {
    /// Suite name
    pub name: String,
    /// Per-scenario outcomes, in execution order
    pub reports: Vec<ScenarioReport>,
    /// Wall-clock duration
    pub duration: Duration,
}

impl SuiteReport {
    /// Whether every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::passed)
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.passed()).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.passed_count()
    }

    /// The failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.passed()).collect()
    }
}

type Hook = Box<dyn FnMut(&mut ScenarioContext) -> EscenarioResult<()>>;

/// Runs scenarios in order against one shared browser context.
pub struct ScenarioRunner {
    ctx: ScenarioContext,
    before_all: Option<Hook>,
    before_each: Option<Hook>,
    after_each: Option<Hook>,
    before_all_ran: bool,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("before_all_ran", &self.before_all_ran)
            .finish_non_exhaustive()
    }
}

impl ScenarioRunner {
    /// Create a runner around a context
    #[must_use]
    pub fn new(ctx: ScenarioContext) -> Self {
        Self {
            ctx,
            before_all: None,
            before_each: None,
            after_each: None,
            before_all_ran: false,
        }
    }

    /// Hook run once before the first scenario (e.g. login bootstrap)
    #[must_use]
    pub fn on_before_all(
        mut self,
        hook: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.before_all = Some(Box::new(hook));
        self
    }

    /// Hook run before each scenario (e.g. session restore, navigation)
    #[must_use]
    pub fn on_before_each(
        mut self,
        hook: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.before_each = Some(Box::new(hook));
        self
    }

    /// Teardown hook run after each scenario, pass or fail (e.g. session
    /// save)
    #[must_use]
    pub fn on_after_each(
        mut self,
        hook: impl FnMut(&mut ScenarioContext) -> EscenarioResult<()> + 'static,
    ) -> Self {
        self.after_each = Some(Box::new(hook));
        self
    }

    /// The shared context
    pub fn context(&mut self) -> &mut ScenarioContext {
        &mut self.ctx
    }

    /// Run one scenario to completion.
    ///
    /// Never panics on a failing step; the outcome lands in the report.
    pub fn run(&mut self, mut scenario: Scenario) -> ScenarioReport {
        let span = info_span!("scenario", title = %scenario.title);
        let _guard = span.enter();
        let start = Instant::now();
        let steps_total = scenario.steps.len();
        let mut state = ScenarioState::Pending;
        let mut steps_run = 0;
        let mut failure: Option<StepFailure> = None;

        if !self.before_all_ran {
            self.before_all_ran = true;
            if let Some(hook) = self.before_all.as_mut() {
                if let Err(err) = hook(&mut self.ctx) {
                    failure = Some(StepFailure {
                        index: None,
                        description: "before-all hook".to_string(),
                        error: err,
                    });
                }
            }
        }

        if failure.is_none() {
            state = ScenarioState::Arranging;
            if let Some(hook) = self.before_each.as_mut() {
                if let Err(err) = hook(&mut self.ctx) {
                    failure = Some(StepFailure {
                        index: None,
                        description: "before-each hook".to_string(),
                        error: err,
                    });
                }
            }
        }

        if failure.is_none() {
            for (index, step) in scenario.steps.iter_mut().enumerate() {
                state = match step.phase {
                    Phase::Arrange => ScenarioState::Arranging,
                    Phase::Act => ScenarioState::Acting,
                    Phase::Assert => ScenarioState::Asserting,
                };
                debug!(step = index, phase = step.phase.as_str(), description = %step.description, "running step");
                match (step.run)(&mut self.ctx) {
                    Ok(()) => steps_run += 1,
                    Err(err) => {
                        failure = Some(StepFailure {
                            index: Some(index),
                            description: step.description.clone(),
                            error: err,
                        });
                        break;
                    }
                }
            }
        }

        // Teardown runs exactly once, pass or fail, so state corruption
        // does not cascade into the next scenario.
        if let Some(hook) = self.after_each.as_mut() {
            if let Err(err) = hook(&mut self.ctx) {
                if failure.is_none() {
                    failure = Some(StepFailure {
                        index: None,
                        description: "after-each hook".to_string(),
                        error: err,
                    });
                } else {
                    error!(error = %err, "teardown hook failed after scenario failure");
                }
            }
        }

        match &failure {
            None => info!(steps = steps_run, "scenario passed"),
            Some(f) => error!(state = ?state, failure = %f, "scenario failed"),
        }
        let state = if failure.is_some() {
            ScenarioState::Failed
        } else {
            ScenarioState::Passed
        };

        ScenarioReport {
            title: scenario.title,
            state,
            failure,
            steps_run,
            steps_total,
            duration: start.elapsed(),
        }
    }

    /// Run scenarios in declared order. A failed scenario never aborts the
    /// rest of the suite.
    pub fn run_all(
        &mut self,
        name: impl Into<String>,
        scenarios: Vec<Scenario>,
    ) -> SuiteReport {
        let name = name.into();
        let start = Instant::now();
        let reports = scenarios
            .into_iter()
            .map(|scenario| self.run(scenario))
            .collect();
        SuiteReport {
            name,
            reports,
            duration: start.elapsed(),
        }
    }
}
