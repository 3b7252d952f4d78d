use alloy_primitives::{Address, address};
use revm::{
    Context, ExecuteCommitEvm, MainBuilder, MainContext,
    context_interface::result::{ExecutionResult, Output},
    database::InMemoryDB,
    database_interface::DatabaseRef,
    primitives::{B256, Bytes, KECCAK_EMPTY, TxKind, U256, keccak256},
    state::{AccountInfo, Bytecode},
};
use tracing::instrument;

use crate::Error;

/// Default gas limit for every transaction, equal to the default block gas limit.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// First development account of the usual local test networks.
pub const DEFAULT_CALLER: Address = address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// A verifier contract created by [`EvmEnv::deploy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Address the contract was created at.
    pub address: Address,
    /// Runtime code returned by the constructor.
    pub code: Bytes,
    /// Keccak digest of the runtime code.
    pub codehash: B256,
    pub gas_used: u64,
}

/// Result of a message call that was executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Success { output: Bytes, gas_used: u64 },
    Revert { output: Bytes, gas_used: u64 },
    Halt { reason: String, gas_used: u64 },
}

/// In-memory EVM with a single funded signer.
///
/// Every transaction runs on a fresh mainnet EVM built over the same database, and its state
/// changes are committed before the next one.
#[derive(Debug)]
pub struct EvmEnv {
    db: InMemoryDB,
    caller: Address,
    gas_limit: u64,
}

impl Default for EvmEnv {
    fn default() -> Self {
        Self::new(DEFAULT_CALLER, DEFAULT_GAS_LIMIT)
    }
}

impl EvmEnv {
    /// Setup an environment where `caller` signs every transaction.
    pub fn new(caller: Address, gas_limit: u64) -> Self {
        let mut db = InMemoryDB::default();
        let balance = U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64));
        db.insert_account_info(
            caller,
            AccountInfo {
                balance,
                ..Default::default()
            },
        );

        Self {
            db,
            caller,
            gas_limit,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Current nonce of the signer.
    pub fn nonce(&self) -> u64 {
        self.db
            .basic_ref(self.caller)
            .ok()
            .flatten()
            .map_or(0, |info| info.nonce)
    }

    /// Runtime code at `address`, if any.
    pub fn code_at(&self, address: Address) -> Option<Bytes> {
        let info = self.db.basic_ref(address).ok().flatten()?;
        if info.code_hash == KECCAK_EMPTY {
            return None;
        }
        let code = match info.code {
            Some(code) => code,
            None => self.db.code_by_hash_ref(info.code_hash).ok()?,
        };
        Some(code.original_bytes()).filter(|code| !code.is_empty())
    }

    /// Place runtime code at `address` without a deployment transaction.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let bytecode = Bytecode::new_raw(code);
        self.db.insert_account_info(
            address,
            AccountInfo {
                nonce: 1,
                code_hash: bytecode.hash_slow(),
                code: Some(bytecode),
                ..Default::default()
            },
        );
    }

    /// Submit a contract creation transaction with the given initialisation code.
    #[instrument("EvmEnv::deploy", skip_all, fields(init_code_len = init_code.len()))]
    pub fn deploy(&mut self, init_code: &[u8]) -> Result<Deployment, Error> {
        match self.transact(TxKind::Create, init_code.to_vec().into())? {
            ExecutionResult::Success {
                output: Output::Create(code, Some(address)),
                gas_used,
                ..
            } => {
                if code.is_empty() {
                    return Err(Error::Deployment(format!(
                        "constructor returned empty code: gas_used={gas_used}"
                    )));
                }
                let codehash = keccak256(&code);
                tracing::debug!(%address, %codehash, gas_used, "contract deployed");
                Ok(Deployment {
                    address,
                    code,
                    codehash,
                    gas_used,
                })
            }
            ExecutionResult::Success { gas_used, .. } => Err(Error::Deployment(format!(
                "contract creation returned no address: gas_used={gas_used}"
            ))),
            ExecutionResult::Revert { gas_used, output } => Err(Error::Deployment(format!(
                "contract deployment tx reverted: gas_used={gas_used}, output={output:#x}"
            ))),
            ExecutionResult::Halt { reason, gas_used } => Err(Error::Deployment(format!(
                "contract deployment tx halted unexpectedly: gas_used={gas_used}, reason={reason:?}"
            ))),
        }
    }

    /// Submit a message call to `to`.
    #[instrument("EvmEnv::call", skip_all, fields(%to, calldata_len = calldata.len()))]
    pub fn call(&mut self, to: Address, calldata: Bytes) -> Result<CallOutcome, Error> {
        let outcome = match self.transact(TxKind::Call(to), calldata)? {
            ExecutionResult::Success {
                output, gas_used, ..
            } => CallOutcome::Success {
                output: output.into_data(),
                gas_used,
            },
            ExecutionResult::Revert { gas_used, output } => {
                CallOutcome::Revert { output, gas_used }
            }
            ExecutionResult::Halt { reason, gas_used } => CallOutcome::Halt {
                reason: format!("{reason:?}"),
                gas_used,
            },
        };
        Ok(outcome)
    }

    fn transact(&mut self, kind: TxKind, data: Bytes) -> Result<ExecutionResult, Error> {
        let (caller, nonce, gas_limit) = (self.caller, self.nonce(), self.gas_limit);

        let mut evm = Context::mainnet()
            .modify_tx_chained(|tx| {
                tx.caller = caller;
                tx.nonce = nonce;
                tx.gas_limit = gas_limit;
                tx.kind = kind;
                tx.data = data;
            })
            .with_db(&mut self.db)
            .build_mainnet();

        evm.replay_commit()
            .map_err(|e| Error::Environment(e.to_string()))
    }
}

/// Wrap runtime code in a constructor that copies it to memory and returns it.
///
/// The runtime length is pushed as a 2-byte immediate, so it must stay below 64KiB.
pub fn creation_code(runtime: &[u8]) -> Result<Bytes, Error> {
    // PUSH2 len, DUP1, PUSH1 offset, PUSH1 0, CODECOPY, PUSH1 0, RETURN
    const PREFIX_LEN: u8 = 12;

    let len = u16::try_from(runtime.len()).map_err(|_| {
        Error::Deployment(format!(
            "runtime code of {} bytes does not fit in a PUSH2 length",
            runtime.len()
        ))
    })?;
    let [hi, lo] = len.to_be_bytes();
    let mut code = vec![
        0x61, hi, lo, 0x80, 0x60, PREFIX_LEN, 0x60, 0x00, 0x39, 0x60, 0x00, 0xf3,
    ];
    code.extend_from_slice(runtime);
    Ok(code.into())
}
