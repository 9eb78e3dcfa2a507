use near_units::parse_near;
use near_workspaces::network::Sandbox;
use near_workspaces::{Account, Contract, Worker};
use serde_json::json;

/// Initial balance of accounts created with `create_voter`.
pub const VOTER_BALANCE: u128 = parse_near!("10 N");

/// Build contract from sources, deploy it to a dev account and initialize it
pub async fn build_contract(
    worker: &Worker<Sandbox>,
    project_path: &str,
    init_method: &str,
    args: serde_json::Value,
) -> anyhow::Result<Contract> {
    let mut wasm;
    let mut retry_count = 3;
    // Under some circumstances compilation could provide zero length built wasm. In this case we retry.
    loop {
        wasm = near_workspaces::compile_project(project_path).await?;
        if !wasm.is_empty() || retry_count == 0 {
            break;
        }
        retry_count -= 1;
    }

    let contract = worker.dev_deploy(&wasm).await?;

    // initialize contract
    let _ = contract
        .call(init_method)
        .args_json(args)
        .max_gas()
        .transact()
        .await?
        .into_result()?;

    Ok(contract)
}

/// Builds, deploys and initializes the voting contract located at `project_path`.
pub async fn deploy_voting(
    worker: &Worker<Sandbox>,
    project_path: &str,
) -> anyhow::Result<Contract> {
    build_contract(worker, project_path, "new", json!({})).await
}

/// Creates a funded `name.<root>` sub-account to act as a voter.
pub async fn create_voter(worker: &Worker<Sandbox>, name: &str) -> anyhow::Result<Account> {
    let account = worker
        .root_account()?
        .create_subaccount(name)
        .initial_balance(VOTER_BALANCE)
        .transact()
        .await?
        .into_result()?;
    Ok(account)
}
