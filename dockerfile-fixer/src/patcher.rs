use anyhow::{Context, Result};
use regex::Regex;

/// What happened to a single anchor rule when it was applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The anchor matched and was rewritten.
    Applied,
    /// The anchor is gone but the rewritten text is already present.
    AlreadyPatched,
    /// Neither the anchor nor the rewritten text was found.
    NotFound,
}

#[derive(Debug)]
pub struct RuleReport {
    pub rule: &'static str,
    pub outcome: RuleOutcome,
}

#[derive(Debug)]
pub struct PatchReport {
    pub rules: Vec<RuleReport>,
}

impl PatchReport {
    /// True when every rule either applied or was already applied.
    pub fn fully_patched(&self) -> bool {
        self.rules
            .iter()
            .all(|r| r.outcome != RuleOutcome::NotFound)
    }
}

enum Matcher {
    Literal(String),
    Pattern(Regex),
}

struct PatchRule {
    name: &'static str,
    matcher: Matcher,
    replacement: String,
}

impl PatchRule {
    fn apply(&self, content: &str) -> (String, RuleOutcome) {
        let matched = match &self.matcher {
            Matcher::Literal(needle) => content.contains(needle.as_str()),
            Matcher::Pattern(re) => re.is_match(content),
        };

        if !matched {
            let outcome = if content.contains(self.replacement.as_str()) {
                RuleOutcome::AlreadyPatched
            } else {
                RuleOutcome::NotFound
            };
            return (content.to_string(), outcome);
        }

        let rewritten = match &self.matcher {
            Matcher::Literal(needle) => content.replace(needle.as_str(), &self.replacement),
            Matcher::Pattern(re) => re
                .replace_all(content, regex::NoExpand(&self.replacement))
                .into_owned(),
        };
        (rewritten, RuleOutcome::Applied)
    }
}

/// The three anchor rules that move a service Dockerfile from the per-crate
/// build template to the workspace-aware one.
fn rules_for(service: &str) -> Result<Vec<PatchRule>> {
    let svc = regex::escape(service);

    // The whole per-crate dependency pre-build block, comments included.
    let dep_copy_pattern = format!(
        "# Copy dependency files first for better layer caching\n\
         COPY services/{svc}/Cargo\\.toml services/{svc}/Cargo\\.lock \\./\n\
         \n\
         # Create src directory with placeholder main\\.rs to enable dependency pre-build\n\
         RUN mkdir src && echo \"fn main\\(\\) \\{{\\}}\" > src/main\\.rs\n\
         \n\
         # Pre-build dependencies \\(this layer will be cached\\)\n\
         RUN cargo build --release && rm -rf src target/release/deps/{svc}_service\\*"
    );
    let dep_copy_replacement = format!(
        "# Copy workspace files for dependency resolution\n\
         COPY Cargo.toml Cargo.lock ./\n\
         COPY services/{service}/Cargo.toml ./services/{service}/\n\
         \n\
         # Create placeholder workspace structure for dependency pre-build\n\
         RUN mkdir -p services/{service}/src && echo \"fn main() {{}}\" > services/{service}/src/main.rs\n\
         \n\
         # Pre-build dependencies (this layer will be cached)\n\
         RUN cargo build --release --bin {service}-service"
    );

    let src_copy_old = format!(
        "# Copy source code\nCOPY services/{service}/src ./src/"
    );
    let src_copy_new = format!(
        "# Copy actual source code\nCOPY services/{service}/src ./services/{service}/src/"
    );

    let final_build_old =
        "# Build the application binary\nRUN cargo build --release --target x86_64-unknown-linux-musl"
            .to_string();
    let final_build_new = format!(
        "# Build the application binary\nRUN cargo build --release --bin {service}-service --target x86_64-unknown-linux-musl"
    );

    Ok(vec![
        PatchRule {
            name: "dependency-copy",
            matcher: Matcher::Pattern(
                Regex::new(&dep_copy_pattern)
                    .with_context(|| format!("Invalid dependency-copy pattern for {service}"))?,
            ),
            replacement: dep_copy_replacement,
        },
        PatchRule {
            name: "source-copy",
            matcher: Matcher::Literal(src_copy_old),
            replacement: src_copy_new,
        },
        PatchRule {
            name: "final-build",
            matcher: Matcher::Literal(final_build_old),
            replacement: final_build_new,
        },
    ])
}

/// Apply all three rules in order. Rules that find nothing leave the text
/// untouched and are reported as such; the caller decides what to do with an
/// incomplete report.
pub fn patch_dockerfile(content: &str, service: &str) -> Result<(String, PatchReport)> {
    let mut current = content.to_string();
    let mut reports = Vec::new();

    for rule in rules_for(service)? {
        let (next, outcome) = rule.apply(&current);
        current = next;
        reports.push(RuleReport {
            rule: rule.name,
            outcome,
        });
    }

    Ok((current, PatchReport { rules: reports }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_crate_dockerfile(service: &str) -> String {
        format!(
            "FROM rust:1.79-alpine AS builder\n\
             WORKDIR /build\n\
             \n\
             # Copy dependency files first for better layer caching\n\
             COPY services/{service}/Cargo.toml services/{service}/Cargo.lock ./\n\
             \n\
             # Create src directory with placeholder main.rs to enable dependency pre-build\n\
             RUN mkdir src && echo \"fn main() {{}}\" > src/main.rs\n\
             \n\
             # Pre-build dependencies (this layer will be cached)\n\
             RUN cargo build --release && rm -rf src target/release/deps/{service}_service*\n\
             \n\
             # Copy source code\n\
             COPY services/{service}/src ./src/\n\
             \n\
             # Build the application binary\n\
             RUN cargo build --release --target x86_64-unknown-linux-musl\n\
             \n\
             FROM scratch\n\
             COPY --from=builder /build/target/x86_64-unknown-linux-musl/release/{service}-service /{service}-service\n\
             ENTRYPOINT [\"/{service}-service\"]\n"
        )
    }

    #[test]
    fn test_all_rules_apply() {
        let input = per_crate_dockerfile("identity");
        let (output, report) = patch_dockerfile(&input, "identity").unwrap();

        assert!(report.fully_patched());
        for rule in &report.rules {
            assert_eq!(rule.outcome, RuleOutcome::Applied, "rule {}", rule.rule);
        }

        assert!(output.contains("# Copy workspace files for dependency resolution"));
        assert!(output.contains("COPY Cargo.toml Cargo.lock ./"));
        assert!(output.contains("COPY services/identity/Cargo.toml ./services/identity/"));
        assert!(output.contains("RUN mkdir -p services/identity/src"));
        assert!(!output.contains("# Copy dependency files first for better layer caching"));
    }

    #[test]
    fn test_source_copy_rewritten_to_nested_path() {
        let input = per_crate_dockerfile("identity");
        let (output, _) = patch_dockerfile(&input, "identity").unwrap();

        assert!(output.contains("COPY services/identity/src ./services/identity/src/"));
        assert!(!output.contains("COPY services/identity/src ./src/"));
    }

    #[test]
    fn test_final_build_names_the_binary() {
        let input = per_crate_dockerfile("identity");
        let (output, _) = patch_dockerfile(&input, "identity").unwrap();

        assert!(output.contains(
            "RUN cargo build --release --bin identity-service --target x86_64-unknown-linux-musl"
        ));
    }

    #[test]
    fn test_second_run_is_a_reported_noop() {
        let input = per_crate_dockerfile("payment");
        let (once, first) = patch_dockerfile(&input, "payment").unwrap();
        assert!(first.fully_patched());

        let (twice, second) = patch_dockerfile(&once, "payment").unwrap();
        assert_eq!(once, twice);
        assert!(second.fully_patched());
        for rule in &second.rules {
            assert_eq!(
                rule.outcome,
                RuleOutcome::AlreadyPatched,
                "rule {}",
                rule.rule
            );
        }
    }

    #[test]
    fn test_missing_anchor_is_reported_and_rest_still_patched() {
        let input =
            per_crate_dockerfile("social").replace("# Copy source code\nCOPY services/social/src ./src/\n\n", "");
        let (output, report) = patch_dockerfile(&input, "social").unwrap();

        assert!(!report.fully_patched());
        let source_copy = report
            .rules
            .iter()
            .find(|r| r.rule == "source-copy")
            .unwrap();
        assert_eq!(source_copy.outcome, RuleOutcome::NotFound);

        // The other two rules still went through.
        assert!(output.contains("# Copy workspace files for dependency resolution"));
        assert!(output.contains("--bin social-service --target x86_64-unknown-linux-musl"));
    }

    #[test]
    fn test_underscored_service_names() {
        let input = per_crate_dockerfile("ai_data");
        let (output, report) = patch_dockerfile(&input, "ai_data").unwrap();

        assert!(report.fully_patched());
        assert!(output.contains("RUN cargo build --release --bin ai_data-service"));
        assert!(output.contains("COPY services/ai_data/src ./services/ai_data/src/"));
    }

    #[test]
    fn test_unrelated_text_untouched() {
        let input = per_crate_dockerfile("mission");
        let (output, _) = patch_dockerfile(&input, "mission").unwrap();

        assert!(output.starts_with("FROM rust:1.79-alpine AS builder"));
        assert!(output.contains("ENTRYPOINT [\"/mission-service\"]"));
    }
}
