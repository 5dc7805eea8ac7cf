use std::path::Path;
use std::sync::Arc;

use sluice_core::parser::parse_auth_config_str;
use sluice_core::types::{EndpointAuthConfig, SourceSpec};
use sluice_core::{parse_invocation_str, resolve_invocation, DocumentFormat, ParseError};
use sluice_exec::{
    AuthGate, Fetcher, InboundRequest, PipelineResult, PipelineRunner, ReqwestHttpClient,
    StaticTokenIdentityProvider,
};
use sluice_store::PostgresStore;

use crate::cmd::config::{build_engine_config, database_url, read_input};
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::utils::{parse_key_values, redact_url_password};
use crate::{AuthArgs, FetchArgs, OutputArgs, RuntimeArgs, StoreArgs};

const API_TOKENS_ENV: &str = "SLUICE_API_TOKENS";

pub async fn run_cmd(
    path: &Path,
    runtime: RuntimeArgs,
    fetch: FetchArgs,
    auth: AuthArgs,
    store: StoreArgs,
    fail_on_error: bool,
    output: OutputArgs,
) -> i32 {
    let content = match read_input(path, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    // Malformed documents get the same failure envelope as failed validation.
    let mut request = match parse_invocation_str(&content, DocumentFormat::Auto) {
        Ok(parsed) => parsed.request,
        Err(e) => {
            tracing::warn!(error = %e, "invalid pipeline document");
            let result = PipelineResult::failure(parse_error_message(&e), 500);
            print_result(output.format, output.quiet, &result);
            return exit_code_for(&result, fail_on_error);
        }
    };

    if let Err(e) = apply_runtime_args(&mut request, &runtime) {
        print_error(output.format, output.quiet, &e);
        return exit_codes::VALIDATION_FAILED;
    }

    let (auth_config, inbound) = match load_auth(&auth, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let config = build_engine_config(&fetch);
    let http = match ReqwestHttpClient::new(&config.user_agent) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let mut fetcher = Fetcher::new(http, config.fetch.clone());
    let mut gate = AuthGate::new();

    if let Ok(tokens) = std::env::var(API_TOKENS_ENV) {
        let provider = StaticTokenIdentityProvider::from_list(&tokens, "api-token");
        if !provider.is_empty() {
            gate = gate.with_identity_provider(Arc::new(provider));
        }
    }

    if needs_store(&request, auth_config.as_ref()) {
        if let Some(url) = database_url(store.store) {
            tracing::info!(store = %redact_url_password(&url), "using postgres store");
            match PostgresStore::connect_lazy(&url, 5) {
                Ok(pg) => {
                    let pg = Arc::new(pg);
                    fetcher = fetcher.with_database(pg.clone());
                    gate = gate.with_api_keys(pg);
                }
                Err(e) => {
                    print_error(
                        output.format,
                        output.quiet,
                        &format!("invalid database url: {e}"),
                    );
                    return exit_codes::RUNTIME_ERROR;
                }
            }
        }
    }

    let runner = PipelineRunner::new(fetcher).with_auth_gate(gate);
    let result = match &auth_config {
        Some(auth_config) => runner.handle(&inbound, auth_config, &request).await,
        None => runner.run(&request).await,
    };

    print_result(output.format, output.quiet, &result);
    exit_code_for(&result, fail_on_error)
}

fn exit_code_for(result: &PipelineResult, fail_on_error: bool) -> i32 {
    if !result.success {
        return match result.status {
            401 | 403 => exit_codes::AUTH_DENIED,
            _ => exit_codes::VALIDATION_FAILED,
        };
    }
    if fail_on_error && !result.failed_sources.is_empty() {
        return exit_codes::RUN_FAILED;
    }
    exit_codes::SUCCESS
}

fn parse_error_message(e: &ParseError) -> String {
    match e {
        ParseError::Json(e) => format!("JSON parse failed: {e}"),
        ParseError::Yaml(e) => format!("YAML parse failed: {e}"),
        ParseError::UnknownFormat => "input is neither valid JSON nor valid YAML".to_string(),
    }
}

fn apply_runtime_args(
    request: &mut sluice_core::InvocationRequest,
    runtime: &RuntimeArgs,
) -> Result<(), String> {
    for (k, v) in parse_key_values(&runtime.params, "param")? {
        request.params.insert(k.to_string(), v.to_string());
    }
    for (k, v) in parse_key_values(&runtime.headers, "header")? {
        request.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(k));
        request.headers.insert(k.to_string(), v.to_string());
    }
    if let Some(method) = &runtime.method {
        request.method = Some(method.clone());
    }
    Ok(())
}

fn load_auth(
    auth: &AuthArgs,
    output: &OutputArgs,
) -> Result<(Option<EndpointAuthConfig>, InboundRequest), i32> {
    let mut inbound = InboundRequest::new();
    let credentials = parse_key_values(&auth.credentials, "credential").map_err(|e| {
        print_error(output.format, output.quiet, &e);
        exit_codes::VALIDATION_FAILED
    })?;
    for (name, value) in credentials {
        inbound = inbound.with_header(name, value);
    }

    let Some(path) = &auth.auth_config else {
        return Ok((None, inbound));
    };
    let content = read_input(path, output)?;
    let config = parse_auth_config_str(&content, DocumentFormat::Auto).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("invalid auth config: {}", parse_error_message(&e)),
        );
        exit_codes::VALIDATION_FAILED
    })?;
    Ok((Some(config), inbound))
}

/// Only connect when a database source or an API-key policy needs it.
fn needs_store(
    request: &sluice_core::InvocationRequest,
    auth_config: Option<&EndpointAuthConfig>,
) -> bool {
    if matches!(auth_config, Some(EndpointAuthConfig::ApiKey { .. })) {
        return true;
    }
    resolve_invocation(request).is_ok_and(|pipeline| {
        pipeline
            .sources
            .iter()
            .any(|s| matches!(s.spec, SourceSpec::Database(_)))
    })
}
