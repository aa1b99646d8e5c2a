//! Provider routing policy
//!
//! Maps a configured [`Strategy`] to an ordered [`RoutePlan`]. The policy is a
//! pure function: it keeps no record of provider health between queries, so
//! every query gets the same plan for the same strategy.

use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy selecting which provider(s) to try and in what order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Tavily only, no fallback
    TavilyOnly,
    /// SerpAPI only, no fallback
    SerpOnly,
    /// Tavily first, SerpAPI only if Tavily fails
    #[default]
    Intelligent,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TavilyOnly => "tavily_only",
            Self::SerpOnly => "serp_only",
            Self::Intelligent => "intelligent",
        }
    }

    /// Whether any plan step for this strategy targets Tavily
    pub fn uses_tavily(&self) -> bool {
        RoutingPolicy::plan(*self).contains(ProviderKind::Tavily)
    }

    /// Whether any plan step for this strategy targets SerpAPI
    pub fn uses_serp(&self) -> bool {
        RoutingPolicy::plan(*self).contains(ProviderKind::Serp)
    }

    pub fn all() -> [Strategy; 3] {
        [Self::TavilyOnly, Self::SerpOnly, Self::Intelligent]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tavily_only" | "tavily" => Ok(Self::TavilyOnly),
            "serp_only" | "serp" => Ok(Self::SerpOnly),
            "intelligent" => Ok(Self::Intelligent),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Returned when a strategy name does not match any [`Strategy`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search strategy: {0:?} (expected tavily_only, serp_only or intelligent)")]
pub struct UnknownStrategy(pub String);

/// One step of a route plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub provider: ProviderKind,
    /// Only run when every earlier step failed
    pub is_fallback: bool,
}

impl PlanStep {
    pub fn primary(provider: ProviderKind) -> Self {
        Self {
            provider,
            is_fallback: false,
        }
    }

    pub fn fallback(provider: ProviderKind) -> Self {
        Self {
            provider,
            is_fallback: true,
        }
    }
}

/// Ordered provider plan for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    strategy: Strategy,
    steps: Vec<PlanStep>,
}

impl RoutePlan {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, provider: ProviderKind) -> bool {
        self.steps.iter().any(|s| s.provider == provider)
    }

    /// Providers in attempt order
    pub fn providers(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.steps.iter().map(|s| s.provider)
    }
}

impl<'a> IntoIterator for &'a RoutePlan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Stateless routing policy
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingPolicy;

impl RoutingPolicy {
    /// Build the plan for a strategy. Fallback steps are never run
    /// alongside the primary; the orchestrator walks the plan in order.
    pub fn plan(strategy: Strategy) -> RoutePlan {
        let steps = match strategy {
            Strategy::TavilyOnly => vec![PlanStep::primary(ProviderKind::Tavily)],
            Strategy::SerpOnly => vec![PlanStep::primary(ProviderKind::Serp)],
            Strategy::Intelligent => vec![
                PlanStep::primary(ProviderKind::Tavily),
                PlanStep::fallback(ProviderKind::Serp),
            ],
        };

        RoutePlan { strategy, steps }
    }
}
