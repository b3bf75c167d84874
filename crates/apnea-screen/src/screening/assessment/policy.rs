use serde::{Deserialize, Serialize};

/// Standard BMI bands shown on the metrics step and in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Bands are closed exactly as published: [18.5, 25) normal,
    /// [25, 30) overweight, 30 and above obese.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

/// Screening risk band; shares its thresholds with `Priority` but is carried
/// as an independent field everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score <= 3 {
            RiskLevel::Low
        } else if score <= 5 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Human-readable category line for reports and notifications.
    pub const fn category(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low probability of obstructive sleep apnea",
            RiskLevel::Medium => "Intermediate probability of obstructive sleep apnea",
            RiskLevel::High => "High probability of obstructive sleep apnea",
        }
    }
}

/// Outreach priority for the care team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_score(score: u8) -> Self {
        if score >= 6 {
            Priority::High
        } else if score >= 4 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}
