//! Message format registry.
//!
//! The registry owns the Local and Company catalogs. Lookup searches Local
//! before Company and returns the first match in insertion order; duplicate
//! headers are allowed. Company entries change wholesale through
//! `replace_company`/`refresh_company`, and directly only when the registry
//! carries administrator privilege.
//!
//! The registry has no interior mutability. Hosts that poll and refresh
//! from different threads serialize access with a single mutex around the
//! owner.

pub mod error;
pub mod provider;

pub use error::{ProvisionError, RegistryError};
pub use provider::FormatProvider;

use log::debug;

use crate::sink::{Sink, SinkEvent};
use crate::{CatalogKind, MessageFormat};

/// Identifies the entry to remove from a catalog.
#[derive(Debug, Clone, Copy)]
pub enum FormatSelector<'a> {
    /// First entry equal to the given format.
    Format(&'a MessageFormat),
    /// Position within the catalog.
    Index(usize),
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    local: Vec<MessageFormat>,
    company: Vec<MessageFormat>,
    administrator: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_administrator(administrator: bool) -> Self {
        Self {
            administrator,
            ..Self::default()
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.administrator
    }

    pub fn set_administrator(&mut self, administrator: bool) {
        self.administrator = administrator;
    }

    /// Append a format to a catalog.
    ///
    /// # Errors
    /// Returns `RegistryError::AdministratorRequired` when adding to the
    /// Company catalog without administrator privilege.
    pub fn add(&mut self, format: MessageFormat, catalog: CatalogKind) -> Result<(), RegistryError> {
        self.require_mutable(catalog)?;
        debug!(
            "add {} format {:02X} {:02X} '{}'",
            catalog, format.id_high, format.id_low, format.name
        );
        self.catalog_mut(catalog).push(format);
        Ok(())
    }

    /// Remove one entry; returns whether anything was removed.
    ///
    /// Removal from the Company catalog is a no-op without administrator
    /// privilege.
    ///
    /// # Examples
    /// ```
    /// use mpac_core::{CatalogKind, FormatSelector, MessageFormat, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry.add(MessageFormat::new(1, 2, "A", 0, ""), CatalogKind::Local)?;
    /// assert!(registry.remove(FormatSelector::Index(0), CatalogKind::Local));
    /// assert!(!registry.remove(FormatSelector::Index(0), CatalogKind::Local));
    /// # Ok::<(), mpac_core::RegistryError>(())
    /// ```
    pub fn remove(&mut self, selector: FormatSelector<'_>, catalog: CatalogKind) -> bool {
        if self.require_mutable(catalog).is_err() {
            debug!("refusing to remove from {} catalog without privilege", catalog);
            return false;
        }
        let entries = self.catalog_mut(catalog);
        let index = match selector {
            FormatSelector::Format(format) => entries.iter().position(|entry| entry == format),
            FormatSelector::Index(index) => (index < entries.len()).then_some(index),
        };
        match index {
            Some(index) => {
                let removed = entries.remove(index);
                debug!(
                    "removed {} format {:02X} {:02X} '{}'",
                    catalog, removed.id_high, removed.id_low, removed.name
                );
                true
            }
            None => false,
        }
    }

    pub fn count(&self, catalog: CatalogKind) -> usize {
        self.catalog(catalog).len()
    }

    pub fn list(&self, catalog: CatalogKind) -> &[MessageFormat] {
        self.catalog(catalog)
    }

    /// Find the format for a header, Local first.
    pub fn lookup(&self, id_high: u8, id_low: u8) -> Option<(&MessageFormat, CatalogKind)> {
        [CatalogKind::Local, CatalogKind::Company]
            .into_iter()
            .find_map(|catalog| {
                self.catalog(catalog)
                    .iter()
                    .find(|format| format.matches(id_high, id_low))
                    .map(|format| (format, catalog))
            })
    }

    /// Whether any registered header begins with `id_high`.
    pub fn starts_header(&self, id_high: u8) -> bool {
        self.local
            .iter()
            .chain(&self.company)
            .any(|format| format.id_high == id_high)
    }

    /// Replace the whole Local catalog (import path).
    pub fn replace_local(&mut self, formats: Vec<MessageFormat>) {
        debug!(
            "replacing local catalog: {} -> {} formats",
            self.local.len(),
            formats.len()
        );
        self.local = formats;
    }

    /// Replace the whole Company catalog (provisioning path).
    pub fn replace_company(&mut self, formats: Vec<MessageFormat>) {
        debug!(
            "replacing company catalog: {} -> {} formats",
            self.company.len(),
            formats.len()
        );
        self.company = formats;
    }

    /// Fetch every provider, then swap the Company catalog in one step.
    ///
    /// # Errors
    /// Returns the first provider error; the Company catalog is left
    /// untouched in that case.
    pub fn refresh_company<S: Sink + ?Sized>(
        &mut self,
        providers: &[&dyn FormatProvider],
        sink: &mut S,
    ) -> Result<usize, ProvisionError> {
        sink.emit(SinkEvent::StatusNote("company refresh started".to_string()));
        let mut formats = Vec::new();
        for provider in providers {
            let fetched = match provider.fetch() {
                Ok(fetched) => fetched,
                Err(err) => {
                    sink.emit(SinkEvent::StatusNote(format!(
                        "company refresh aborted: {err}"
                    )));
                    return Err(err);
                }
            };
            sink.emit(SinkEvent::StatusNote(format!(
                "{}: {} formats",
                provider.name(),
                fetched.len()
            )));
            formats.extend(fetched);
        }
        let total = formats.len();
        self.replace_company(formats);
        sink.emit(SinkEvent::StatusNote(format!(
            "company refresh complete: {total} formats loaded"
        )));
        Ok(total)
    }

    fn require_mutable(&self, catalog: CatalogKind) -> Result<(), RegistryError> {
        if catalog == CatalogKind::Company && !self.administrator {
            return Err(RegistryError::AdministratorRequired { catalog });
        }
        Ok(())
    }

    fn catalog(&self, catalog: CatalogKind) -> &Vec<MessageFormat> {
        match catalog {
            CatalogKind::Local => &self.local,
            CatalogKind::Company => &self.company,
        }
    }

    fn catalog_mut(&mut self, catalog: CatalogKind) -> &mut Vec<MessageFormat> {
        match catalog {
            CatalogKind::Local => &mut self.local,
            CatalogKind::Company => &mut self.company,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatProvider, FormatSelector, ProvisionError, Registry, RegistryError};
    use crate::sink::SinkEvent;
    use crate::{CatalogKind, MessageFormat};

    struct FixedProvider(Vec<MessageFormat>);

    impl FormatProvider for FixedProvider {
        fn name(&self) -> String {
            "fixed".to_string()
        }

        fn fetch(&self) -> Result<Vec<MessageFormat>, ProvisionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    impl FormatProvider for FailingProvider {
        fn name(&self) -> String {
            "failing".to_string()
        }

        fn fetch(&self) -> Result<Vec<MessageFormat>, ProvisionError> {
            Err(ProvisionError::Provider {
                provider: self.name(),
                message: "unreachable".to_string(),
            })
        }
    }

    fn speed() -> MessageFormat {
        MessageFormat::new(0x01, 0x02, "Speed", 2, "g * 2 h")
    }

    #[test]
    fn lookup_prefers_local_over_company() {
        let mut registry = Registry::with_administrator(true);
        registry
            .add(MessageFormat::new(1, 2, "Company", 0, ""), CatalogKind::Company)
            .unwrap();
        registry
            .add(MessageFormat::new(1, 2, "Local", 0, ""), CatalogKind::Local)
            .unwrap();

        let (format, catalog) = registry.lookup(1, 2).unwrap();
        assert_eq!(format.name, "Local");
        assert_eq!(catalog, CatalogKind::Local);
    }

    #[test]
    fn lookup_first_match_wins_within_catalog() {
        let mut registry = Registry::new();
        registry
            .add(MessageFormat::new(1, 2, "First", 0, ""), CatalogKind::Local)
            .unwrap();
        registry
            .add(MessageFormat::new(1, 2, "Second", 4, ""), CatalogKind::Local)
            .unwrap();

        assert_eq!(registry.lookup(1, 2).unwrap().0.name, "First");
        assert_eq!(registry.count(CatalogKind::Local), 2);
    }

    #[test]
    fn lookup_missing_is_none() {
        let registry = Registry::new();
        assert!(registry.lookup(0xFF, 0xFF).is_none());
    }

    #[test]
    fn company_add_requires_administrator() {
        let mut registry = Registry::new();
        let err = registry.add(speed(), CatalogKind::Company).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AdministratorRequired {
                catalog: CatalogKind::Company
            }
        );
        assert_eq!(registry.count(CatalogKind::Company), 0);
    }

    #[test]
    fn company_remove_is_noop_without_administrator() {
        let mut registry = Registry::new();
        registry.replace_company(vec![speed()]);

        assert!(!registry.remove(FormatSelector::Index(0), CatalogKind::Company));
        assert_eq!(registry.count(CatalogKind::Company), 1);

        registry.set_administrator(true);
        assert!(registry.remove(FormatSelector::Format(&speed()), CatalogKind::Company));
        assert_eq!(registry.count(CatalogKind::Company), 0);
    }

    #[test]
    fn remove_by_format_takes_first_equal_entry() {
        let mut registry = Registry::new();
        let other = MessageFormat::new(3, 4, "Other", 1, "c");
        for format in [speed(), other.clone(), speed()] {
            registry.add(format, CatalogKind::Local).unwrap();
        }

        assert!(registry.remove(FormatSelector::Format(&speed()), CatalogKind::Local));
        assert_eq!(registry.list(CatalogKind::Local), &[other, speed()]);
        assert!(!registry.remove(FormatSelector::Index(5), CatalogKind::Local));
    }

    #[test]
    fn refresh_replaces_company_catalog_wholesale() {
        let mut registry = Registry::new();
        registry.replace_company(vec![MessageFormat::new(9, 9, "Stale", 0, "")]);
        let provider = FixedProvider(vec![speed(), MessageFormat::new(5, 6, "Temp", 1, "c")]);
        let mut events: Vec<SinkEvent> = Vec::new();

        let loaded = registry.refresh_company(&[&provider], &mut events).unwrap();

        assert_eq!(loaded, 2);
        assert!(registry.lookup(9, 9).is_none());
        assert_eq!(registry.lookup(5, 6).unwrap().1, CatalogKind::Company);
        assert_eq!(
            events.last(),
            Some(&SinkEvent::StatusNote(
                "company refresh complete: 2 formats loaded".to_string()
            ))
        );
    }

    #[test]
    fn failed_refresh_keeps_existing_catalog() {
        let mut registry = Registry::new();
        registry.replace_company(vec![speed()]);
        let good = FixedProvider(Vec::new());
        let mut events: Vec<SinkEvent> = Vec::new();

        let result = registry.refresh_company(&[&good, &FailingProvider], &mut events);

        assert!(result.is_err());
        assert_eq!(registry.list(CatalogKind::Company), &[speed()]);
        assert!(matches!(
            events.last(),
            Some(SinkEvent::StatusNote(note)) if note.contains("aborted")
        ));
    }
}
