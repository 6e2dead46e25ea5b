//! CLI command implementations (spec.md §6 "External interfaces")

use crate::config::Config;
use crate::identity::LinkMethod;
use crate::pipeline::{ConstructOptions, EvaluationContext, Pipeline};
use crate::scoring::Action;
use crate::signal::Evidence;
use crate::subject::{Subject, SubjectKey, SubjectType};
use anyhow::Result;
use tracing::info;

fn parse_subject_type(raw: &str) -> Result<SubjectType> {
    match raw {
        "agent" => Ok(SubjectType::Agent),
        "skill" => Ok(SubjectType::Skill),
        "interaction" => Ok(SubjectType::Interaction),
        other => anyhow::bail!("unknown subject type '{other}', expected agent|skill|interaction"),
    }
}

fn parse_action(raw: &str) -> Result<Action> {
    match raw {
        "install" => Ok(Action::Install),
        "execute" => Ok(Action::Execute),
        "delegate" => Ok(Action::Delegate),
        "transact" => Ok(Action::Transact),
        "review" => Ok(Action::Review),
        other => anyhow::bail!("unknown action '{other}'"),
    }
}

fn parse_link_method(raw: &str) -> Result<LinkMethod> {
    match raw {
        "wallet-signed" => Ok(LinkMethod::WalletSigned),
        "manual" => Ok(LinkMethod::Manual),
        "text-challenge" => Ok(LinkMethod::TextChallenge),
        "registry-declared" => Ok(LinkMethod::RegistryDeclared),
        other => anyhow::bail!("unknown link method '{other}'"),
    }
}

fn build_pipeline(config: &Config) -> Pipeline {
    Pipeline::construct(ConstructOptions {
        providers: Vec::new(),
        config: config.clone(),
    })
}

/// `trust-cli evaluate <type> <namespace> <id> [--action ACTION]`
pub async fn evaluate(
    config: &Config,
    subject_type: &str,
    namespace: &str,
    id: &str,
    action: Option<&str>,
) -> Result<()> {
    let kind = parse_subject_type(subject_type)?;
    let action = action.map(parse_action).transpose()?;

    let pipeline = build_pipeline(config);
    let subject = Subject::new(kind, namespace, id);
    let context = EvaluationContext { action };

    let result = pipeline.evaluate(subject, context).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// `trust-cli health`
pub async fn health(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config);
    let statuses = pipeline.health().await;
    for (name, health) in statuses {
        println!(
            "{name}: {:?} (last_check={}, avg_latency_ms={:.1})",
            health.status, health.last_check, health.rolling_avg_latency_ms
        );
    }
    Ok(())
}

/// `trust-cli invalidate <namespace> <id>`
pub async fn invalidate(config: &Config, namespace: &str, id: &str) -> Result<()> {
    let pipeline = build_pipeline(config);
    let key = SubjectKey::from_raw(format!("{namespace}:{id}"));
    let removed = pipeline.invalidate(&key);
    if removed {
        println!("invalidated cache entry for {key}");
    } else {
        println!("no cache entry found for {key}");
    }
    Ok(())
}

/// `trust-cli link <namespace-a> <id-a> <namespace-b> <id-b> --method METHOD`
///
/// Stands in for the external challenge-verification workflow (spec.md §4.3
/// "external verification workflow"): registers an already-verified link
/// directly in the in-process identity graph. Useful for local testing and
/// for operators hydrating links out of band.
pub async fn link(config: &Config, namespace_a: &str, id_a: &str, namespace_b: &str, id_b: &str, method: &str) -> Result<()> {
    let method = parse_link_method(method)?;
    let pipeline = build_pipeline(config);

    let key_a = SubjectKey::from_raw(format!("{namespace_a}:{id_a}"));
    let key_b = SubjectKey::from_raw(format!("{namespace_b}:{id_b}"));
    let link = pipeline
        .identity_graph()
        .add_link(key_a, key_b, method, Evidence::new(), None);

    info!(link_key = %link.link_key(), "identity link registered");
    println!("linked {} <-> {} via {}", link.endpoint_a, link.endpoint_b, link.method);
    Ok(())
}

/// `trust-cli serve-stub`
///
/// A transport adapter (HTTP/RPC server exposing `evaluate`/`health`) is
/// deliberately out of scope (spec.md §1 "Deliberately out of scope"); this
/// command only confirms the pipeline constructs cleanly against the loaded
/// configuration, for operators wiring one up externally.
pub async fn serve_stub(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config);
    let healthy = pipeline.is_healthy().await;
    println!(
        "pipeline constructed ok (providers healthy: {healthy}); no transport adapter is bundled, wire one up against Pipeline::evaluate/health/invalidate"
    );
    Ok(())
}

/// `trust-cli show-config`
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
