//! Input parser: reads `transactions.txt` (or the `transacciones.txt` fallback)
//! and the optional `quorum.txt` under a test folder.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{Result, SimError};
use crate::types::{NodeId, Transaction};

pub struct Input {
    pub account_count: usize,
    pub transactions: Vec<Transaction>,
    pub quorums: Vec<Vec<NodeId>>,
}

pub fn load(test_folder: &Path) -> Result<Input> {
    let (account_count, transactions) = load_transactions(test_folder)?;
    let quorums = load_quorums(test_folder, account_count)?;
    Ok(Input { account_count, transactions, quorums })
}

fn load_transactions(test_folder: &Path) -> Result<(usize, Vec<Transaction>)> {
    let primary = test_folder.join("transactions.txt");
    let fallback = test_folder.join("transacciones.txt");
    let path = if primary.exists() { primary } else { fallback };

    let contents = fs::read_to_string(&path).map_err(|e| {
        SimError::Input(format!("could not read {}: {e}", path.display()))
    })?;
    let mut lines = contents.lines();

    let header = lines
        .next()
        .ok_or_else(|| SimError::Input("transactions file is empty".into()))?;
    let (n, m) = parse_header(header)?;

    let mut transactions = Vec::with_capacity(m);
    for (i, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        transactions.push(parse_transaction_line(line).map_err(|e| {
            SimError::Input(format!("transaction line {} malformed: {e}", i + 2))
        })?);
    }

    if transactions.len() != m {
        warn!(
            "header declared {} transactions but {} were parsed",
            m,
            transactions.len()
        );
    }

    Ok((n, transactions))
}

fn parse_header(line: &str) -> Result<(usize, usize)> {
    let mut parts = line.split(',').map(str::trim);
    let n = parts
        .next()
        .ok_or_else(|| SimError::Input("missing account count".into()))?
        .parse::<usize>()
        .map_err(|e| SimError::Input(format!("invalid account count: {e}")))?;
    let m = parts
        .next()
        .ok_or_else(|| SimError::Input("missing transaction count".into()))?
        .parse::<usize>()
        .map_err(|e| SimError::Input(format!("invalid transaction count: {e}")))?;
    Ok((n, m))
}

fn parse_transaction_line(line: &str) -> std::result::Result<Transaction, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(format!("expected 4 comma-separated fields, got {}", fields.len()));
    }
    let from = fields[0].parse().map_err(|e| format!("bad `from`: {e}"))?;
    let amount = fields[1].parse().map_err(|e| format!("bad `amount`: {e}"))?;
    let to = fields[2].parse().map_err(|e| format!("bad `to`: {e}"))?;
    let post_delay_ms = fields[3].parse().map_err(|e| format!("bad `post_delay_ms`: {e}"))?;
    Ok(Transaction { from, to, amount, post_delay_ms })
}

fn load_quorums(test_folder: &Path, n: usize) -> Result<Vec<Vec<NodeId>>> {
    let path = test_folder.join("quorum.txt");
    if !path.exists() {
        warn!("quorum.txt absent; defaulting every node's quorum to the full node set");
        return Ok((0..n).map(|_| (0..n).collect()).collect());
    }

    let contents = fs::read_to_string(&path)
        .map_err(|e| SimError::Quorum(format!("could not read {}: {e}", path.display())))?;

    let mut quorums = Vec::with_capacity(n);
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            return Err(SimError::Quorum(format!(
                "line {} is blank; quorum.txt requires exactly one non-blank line per node",
                i + 1
            )));
        }
        let mut members: Vec<NodeId> = line
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<NodeId>()
                    .map_err(|e| SimError::Quorum(format!("line {}: {e}", i + 1)))
            })
            .collect::<Result<Vec<_>>>()?;
        if !members.contains(&i) {
            members.push(i);
        }
        quorums.push(members);
    }

    if quorums.len() != n {
        return Err(SimError::Quorum(format!(
            "expected {} quorum lines, found {}",
            n,
            quorums.len()
        )));
    }
    Ok(quorums)
}
