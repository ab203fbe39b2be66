// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity categorization from name tags.
//!
//! Some activities are logged as stand-ins for another sport and carry a tag
//! in their title (`SBEq` for stationary bike, `HEq` for hiking, ...). A tag
//! may be followed by a number, the equivalent value the athlete declared
//! for the proxy activity, e.g. `"Spin class SBEq 12.5"`.

/// One `TAG=Category` rule. Tags match case-insensitively anywhere in the
/// activity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    tag: String,
    category: String,
}

impl TagRule {
    pub fn new(tag: &str, category: &str) -> Self {
        Self {
            tag: tag.trim().to_uppercase(),
            category: category.trim().to_string(),
        }
    }

    /// Parse `"SBEQ=Ride,HEQ=Hiking"`.
    pub fn parse_list(raw: &str) -> Result<Vec<TagRule>, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((tag, category)) if !tag.trim().is_empty() && !category.trim().is_empty() => {
                    Ok(TagRule::new(tag, category))
                }
                _ => Err(format!("expected TAG=Category, got {:?}", pair)),
            })
            .collect()
    }
}

/// Outcome of classifying one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Category used for grouping
    pub category: String,
    /// Tag that produced the category, if any
    pub tag: Option<String>,
    /// Number written right after the tag
    pub declared_value: Option<f64>,
    /// An `...Eq` token no rule recognised
    pub unmatched_tag: Option<String>,
}

/// Classifies activities by name tag, falling back to the sport type.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<TagRule>,
}

impl Classifier {
    pub fn new(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    /// Classify an activity. The first matching rule wins.
    pub fn classify(&self, name: &str, sport_type: &str) -> Classification {
        let upper = name.to_uppercase();

        for rule in &self.rules {
            if let Some(pos) = upper.find(&rule.tag) {
                let rest = &upper[pos + rule.tag.len()..];
                return Classification {
                    category: rule.category.clone(),
                    tag: Some(rule.tag.clone()),
                    declared_value: leading_number(rest),
                    unmatched_tag: None,
                };
            }
        }

        Classification {
            category: sport_type.to_string(),
            tag: None,
            declared_value: None,
            unmatched_tag: find_eq_token(name),
        }
    }
}

/// Parse a number at the start of `text`, after optional spaces/`:`/`=`.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '=');
    let digits: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok().filter(|v: &f64| v.is_finite())
}

/// One to four capitals followed by `Eq` (e.g. `XEq`) looks like an
/// equivalency tag. Ordinary words such as "Freq" do not.
fn find_eq_token(name: &str) -> Option<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .find(|word| {
            word.strip_suffix("Eq").is_some_and(|prefix| {
                (1..=4).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_uppercase())
            })
        })
        .map(str::to_string)
}
