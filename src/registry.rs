//! Look-up-or-create registry of figures keyed by identifier.

use std::convert::Infallible;

use log::debug;

use crate::figure::{FigureId, Identified};

/// Figures owned in creation order.
///
/// Registries are small, so lookup is a linear scan. At most one figure per
/// identifier is live at any time.
pub struct FigureRegistry<F> {
    figures: Vec<F>,
}

impl<F> Default for FigureRegistry<F> {
    fn default() -> Self {
        Self {
            figures: Vec::new(),
        }
    }
}

impl<F: Identified> FigureRegistry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the figure named `id`, creating it with `create` if absent.
    ///
    /// An omitted id never matches: a fresh time-based id is generated and a
    /// new figure is always created.
    pub fn get_or_create(
        &mut self,
        id: Option<FigureId>,
        create: impl FnOnce(FigureId) -> F,
    ) -> &mut F {
        match self.try_get_or_create(id, |id| Ok::<_, Infallible>(create(id))) {
            Ok(figure) => figure,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_create`](Self::get_or_create).
    pub fn try_get_or_create<E>(
        &mut self,
        id: Option<FigureId>,
        create: impl FnOnce(FigureId) -> Result<F, E>,
    ) -> Result<&mut F, E> {
        let id = match id {
            Some(id) => {
                if let Some(index) = self.position(&id) {
                    return Ok(&mut self.figures[index]);
                }
                id
            }
            None => FigureId::generate(|candidate| self.contains(candidate)),
        };
        debug!("registering figure `{id}`");
        self.figures.push(create(id)?);
        let last = self.figures.len() - 1;
        Ok(&mut self.figures[last])
    }

    pub fn get(&self, id: &FigureId) -> Option<&F> {
        self.figures.iter().find(|figure| figure.id() == id)
    }

    pub fn get_mut(&mut self, id: &FigureId) -> Option<&mut F> {
        self.figures.iter_mut().find(|figure| figure.id() == id)
    }

    pub fn contains(&self, id: &FigureId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// Identifiers in creation order.
    pub fn ids(&self) -> impl Iterator<Item = &FigureId> {
        self.figures.iter().map(Identified::id)
    }

    /// Drop the figure named `id`, releasing its window.
    pub fn close(&mut self, id: &FigureId) -> bool {
        match self.position(id) {
            Some(index) => {
                debug!("closing figure `{id}`");
                drop(self.figures.remove(index));
                true
            }
            None => false,
        }
    }

    /// Drop every figure.
    pub fn close_all(&mut self) {
        if !self.figures.is_empty() {
            debug!("closing {} figures", self.figures.len());
        }
        self.figures.clear();
    }

    fn position(&self, id: &FigureId) -> Option<usize> {
        self.figures.iter().position(|figure| figure.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Figure, FigureOptions};
    use crate::host::HeadlessHost;

    struct Named(FigureId);

    impl Identified for Named {
        fn id(&self) -> &FigureId {
            &self.0
        }
    }

    #[test]
    fn explicit_ids_are_reused() {
        let mut registry = FigureRegistry::new();
        let mut created = 0;
        for _ in 0..3 {
            registry.get_or_create(Some(FigureId::from("w1")), |id| {
                created += 1;
                Named(id)
            });
        }
        assert_eq!(created, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn omitted_ids_always_create() {
        let mut registry = FigureRegistry::new();
        registry.get_or_create(None, Named);
        registry.get_or_create(None, Named);
        assert_eq!(registry.len(), 2);
        let ids: Vec<_> = registry.ids().cloned().collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn close_releases_the_window_and_the_id() {
        let host = HeadlessHost::new();
        let mut registry = FigureRegistry::new();
        let id = FigureId::from("w1");
        registry.get_or_create(Some(id.clone()), |id| {
            Figure::new(&host, id, FigureOptions::default())
        });
        assert!(registry.close(&id));
        assert!(!registry.close(&id));
        assert!(host.windows()[0].destroyed);

        registry.get_or_create(Some(id.clone()), |id| {
            Figure::new(&host, id, FigureOptions::default())
        });
        assert_eq!(host.windows().len(), 2);
        registry.close_all();
        assert!(registry.is_empty());
        assert_eq!(host.live_windows(), 0);
    }
}
