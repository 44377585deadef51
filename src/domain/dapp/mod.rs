//! A DApp screen: one contract, a handful of fields read from and written to
//! it, and the wallet session driving both.
//!
//! The screen keeps no UI state of its own beyond what a front-end needs to
//! render: each field exposes its input buffer, its last read value and the
//! state of its last operation as `watch` channels.

use {
    crate::domain::{
        contract,
        eth,
        operation::{self, Control, Kind, Operation},
        wallet,
    },
    std::sync::atomic::{AtomicU64, Ordering},
    tokio::sync::watch,
};

/// Describes a field: the getter it is displayed from and, optionally, the
/// setter it is written with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub getter: String,
    pub setter: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, getter: &str, setter: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            getter: getter.to_owned(),
            setter: setter.map(str::to_owned),
        }
    }
}

#[derive(Debug)]
pub struct Field {
    spec: FieldSpec,
    /// The getter is keyed by an account address.
    owned: bool,
    input: watch::Sender<String>,
    stored: watch::Sender<Option<contract::Value>>,
    read: Control,
    write: Control,
    /// Bumped whenever the stored value is invalidated (a confirmed write,
    /// an account change). Reads started before a bump are discarded.
    generation: AtomicU64,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_writable(&self) -> bool {
        self.spec.setter.is_some()
    }

    /// Whether the field is read for a specific account.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn input(&self) -> String {
        self.input.borrow().clone()
    }

    pub fn stored(&self) -> Option<contract::Value> {
        self.stored.borrow().clone()
    }

    /// The state of the last write submitted from this field.
    pub fn operation(&self) -> Operation {
        self.write.current()
    }

    pub fn subscribe_input(&self) -> watch::Receiver<String> {
        self.input.subscribe()
    }

    pub fn subscribe_stored(&self) -> watch::Receiver<Option<contract::Value>> {
        self.stored.subscribe()
    }

    pub fn subscribe_reads(&self) -> watch::Receiver<Operation> {
        self.read.subscribe()
    }

    pub fn subscribe_writes(&self) -> watch::Receiver<Operation> {
        self.write.subscribe()
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Publishes a read value unless the field was invalidated since the
    /// read started.
    fn publish(&self, generation: u64, value: &contract::Value) -> bool {
        self.stored.send_if_modified(|stored| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *stored = Some(value.clone());
            true
        })
    }

    fn clear(&self) {
        self.invalidate();
        self.stored.send_replace(None);
    }
}

pub struct Dapp {
    name: String,
    controller: wallet::Controller,
    target: contract::ContractTarget,
    /// Transaction page prefix of a block explorer, if links are shown.
    explorer: Option<String>,
    fields: Vec<Field>,
}

impl Dapp {
    /// Creates a screen, checking that every field's methods exist on the
    /// contract and that getters are view methods.
    pub fn new(
        name: impl Into<String>,
        controller: wallet::Controller,
        target: contract::ContractTarget,
        fields: Vec<FieldSpec>,
        explorer: Option<String>,
    ) -> Result<Self, contract::Error> {
        let fields = fields
            .into_iter()
            .map(|spec| {
                if !target.is_view(&spec.getter)? {
                    return Err(contract::Error::UnknownMethod(format!(
                        "{} (not a view method)",
                        spec.getter
                    )));
                }
                if let Some(setter) = &spec.setter {
                    target.function(setter)?;
                }
                Ok(Field {
                    owned: target.takes_owner(&spec.getter)?,
                    spec,
                    input: watch::Sender::new(String::new()),
                    stored: watch::Sender::new(None),
                    read: Control::new(),
                    write: Control::new(),
                    generation: AtomicU64::new(0),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name: name.into(),
            controller,
            target,
            explorer,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controller(&self) -> &wallet::Controller {
        &self.controller
    }

    pub fn target(&self) -> &contract::ContractTarget {
        &self.target
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&Field, wallet::Error> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| wallet::Error::InvalidInput(format!("unknown field {name:?}")))
    }

    /// Connects on explicit user action and loads every field.
    pub async fn connect(&self) -> Result<wallet::Session, wallet::Error> {
        let session = self.controller.request_connection().await?;
        self.refresh_all().await?;
        Ok(session)
    }

    /// Connects on page load if the wallet already authorized this page,
    /// without prompting. Fields that do not depend on an account are loaded
    /// either way.
    pub async fn auto_connect(&self) -> Result<Option<wallet::Session>, wallet::Error> {
        if !self.controller.has_provider() {
            return Ok(None);
        }
        let session = self.controller.restore_connection().await?;
        if session.is_some() {
            self.refresh_all().await?;
        } else {
            for field in self.fields.iter().filter(|field| !field.owned) {
                self.load(field).await?;
            }
        }
        Ok(session)
    }

    /// Ends the session and forgets account specific values.
    pub fn disconnect(&self) {
        self.controller.disconnect();
        for field in self.fields.iter().filter(|field| field.owned) {
            field.clear();
        }
    }

    /// Handles the wallet's `accountsChanged` event. Values read for the
    /// previous account are dropped and, if an account is still connected,
    /// read again for it.
    pub async fn accounts_changed(&self, accounts: &[eth::Address]) -> Result<(), wallet::Error> {
        let before = self.controller.session().map(|session| session.account);
        self.controller.accounts_changed(accounts);
        let after = self.controller.session().map(|session| session.account);
        if before == after {
            return Ok(());
        }

        let owned = self.fields.iter().filter(|field| field.owned);
        if after.is_none() {
            owned.for_each(Field::clear);
            return Ok(());
        }
        owned.clone().for_each(Field::invalidate);
        futures::future::try_join_all(owned.map(|field| self.load(field))).await?;
        Ok(())
    }

    /// Re-reads a field from the contract.
    pub async fn refresh(&self, name: &str) -> Result<contract::Value, wallet::Error> {
        self.load(self.field(name)?).await
    }

    pub async fn refresh_all(&self) -> Result<(), wallet::Error> {
        futures::future::try_join_all(self.fields.iter().map(|field| self.load(field))).await?;
        Ok(())
    }

    /// Reads a field for an arbitrary account without touching the displayed
    /// value.
    pub async fn read_for(
        &self,
        name: &str,
        owner: eth::Address,
    ) -> Result<contract::Value, wallet::Error> {
        let field = self.field(name)?;
        if !field.owned {
            return Err(wallet::Error::InvalidInput(format!(
                "{name} is not read per account"
            )));
        }
        self.controller
            .read_handle(&self.target)?
            .call(&field.spec.getter, &[&format!("{owner:#x}")])
            .await
    }

    pub fn set_input(&self, name: &str, text: &str) -> Result<(), wallet::Error> {
        self.field(name)?.input.send_replace(text.to_owned());
        Ok(())
    }

    /// Writes the field's current input to the contract.
    ///
    /// The transaction hash is published on the field's operation channel as
    /// soon as it is known. Once the transaction is confirmed the field is
    /// read again and its input cleared. On failure the displayed value and
    /// the input stay untouched.
    pub async fn submit(&self, name: &str) -> Result<wallet::Receipt, wallet::Error> {
        let field = self.field(name)?;
        let setter = field
            .spec
            .setter
            .as_deref()
            .ok_or_else(|| wallet::Error::InvalidInput(format!("{name} is read-only")))?;
        let input = field.input();
        if input.trim().is_empty() {
            return Err(wallet::Error::InvalidInput("please enter a value".into()));
        }

        let mut pending = field.write.begin(Kind::Write)?;
        match self.write(field, setter, &input, &mut pending).await {
            Ok(receipt) => {
                pending.confirm();
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(?err, field = name, "write failed");
                pending.fail(err.clone());
                Err(err)
            }
        }
    }

    async fn write(
        &self,
        field: &Field,
        setter: &str,
        input: &str,
        pending: &mut operation::Pending<'_>,
    ) -> Result<wallet::Receipt, wallet::Error> {
        let handle = self.controller.write_handle(&self.target)?;
        let write = self
            .controller
            .submit_write(&handle, setter, &[input])
            .await?;
        pending.broadcast(write.tx());

        let receipt = write.confirm().await?;
        field.invalidate();
        // The write is final at this point; a failing refresh only leaves the
        // display stale.
        if let Err(err) = self.load(field).await {
            tracing::warn!(?err, field = field.name(), "failed to refresh after write");
        }
        field.input.send_replace(String::new());
        Ok(receipt)
    }

    async fn load(&self, field: &Field) -> Result<contract::Value, wallet::Error> {
        let generation = field.generation.load(Ordering::SeqCst);
        let pending = field.read.begin(Kind::Read).ok();
        let result = self.read(field).await;
        match (&result, pending) {
            (Ok(value), pending) => {
                if !field.publish(generation, value) {
                    tracing::debug!(field = field.name(), "discarding stale read");
                }
                if let Some(pending) = pending {
                    pending.confirm();
                }
            }
            (Err(err), Some(pending)) => pending.fail(err.clone()),
            (Err(_), None) => (),
        }
        result
    }

    async fn read(&self, field: &Field) -> Result<contract::Value, wallet::Error> {
        let handle = self.controller.read_handle(&self.target)?;
        if field.owned {
            let session = self.controller.session().ok_or(wallet::Error::NotConnected)?;
            handle
                .call(&field.spec.getter, &[&format!("{:#x}", session.account)])
                .await
        } else {
            handle.call(&field.spec.getter, &[]).await
        }
    }

    /// Builds the block explorer link of a transaction, for display only.
    pub fn explorer_link(&self, tx: eth::TxHash) -> Option<String> {
        self.explorer.as_ref().map(|base| format!("{base}{tx}"))
    }
}
