#![forbid(unsafe_code)]

//! Panel content.
//!
//! Content is a render function plus whatever it captured at creation time.
//! It runs inside the scope that created the panel, so context lookups see
//! that scope's values, and it can reach its own panel through
//! [`RenderCx::panel`].

use std::fmt;
use std::rc::Rc;

use fdeck_core::id::ScopeId;

use crate::controller::PanelController;
use crate::error::UsageError;
use crate::panel::PanelHandle;
use crate::scope::ScopeTree;

type RenderFn = dyn Fn(&RenderCx<'_>, &mut PanelBody);

/// What a panel shows.
///
/// Props passed through [`PanelContent::with_props`] are frozen: later
/// renders always see the values given at creation. Live data should come
/// from scope context instead.
#[derive(Clone)]
pub struct PanelContent {
    render: Rc<RenderFn>,
}

impl PanelContent {
    pub fn new(render: impl Fn(&RenderCx<'_>, &mut PanelBody) + 'static) -> Self {
        Self {
            render: Rc::new(render),
        }
    }

    /// Content rendered from `props` captured once.
    pub fn with_props<P: 'static>(
        props: P,
        render: impl Fn(&P, &RenderCx<'_>, &mut PanelBody) + 'static,
    ) -> Self {
        Self::new(move |cx, body| render(&props, cx, body))
    }

    /// Fixed lines of text.
    pub fn text<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        Self::new(move |_, body| {
            for line in &lines {
                body.line(line.clone());
            }
        })
    }

    /// Content that renders nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(|_, _| {})
    }

    /// Run the render function.
    pub fn render(&self, cx: &RenderCx<'_>) -> PanelBody {
        let mut body = PanelBody::default();
        (self.render)(cx, &mut body);
        body
    }
}

impl fmt::Debug for PanelContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelContent").finish_non_exhaustive()
    }
}

/// Output of one content render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelBody {
    lines: Vec<String>,
}

impl PanelBody {
    /// Append a line.
    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Everything panel content can see while rendering.
pub struct RenderCx<'a> {
    scopes: &'a ScopeTree,
    scope: ScopeId,
    panel: Option<&'a PanelHandle>,
    controller: PanelController,
}

impl<'a> RenderCx<'a> {
    pub(crate) fn new(
        scopes: &'a ScopeTree,
        scope: ScopeId,
        panel: Option<&'a PanelHandle>,
        controller: PanelController,
    ) -> Self {
        Self {
            scopes,
            scope,
            panel,
            controller,
        }
    }

    /// Scope this render runs in.
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Nearest context value of type `T`, searching outward from this scope.
    #[must_use]
    pub fn context<T: 'static>(&self) -> Option<&'a T> {
        self.scopes.context::<T>(self.scope)
    }

    /// Control surface of the panel being rendered.
    ///
    /// # Panics
    ///
    /// Panics when called outside panel content (from [`crate::Deck::with_scope`]).
    /// Use [`Self::try_panel`] to handle that case.
    #[must_use]
    pub fn panel(&self) -> &'a PanelHandle {
        match self.panel {
            Some(panel) => panel,
            None => panic!("{}", UsageError::OutsidePanel),
        }
    }

    pub fn try_panel(&self) -> Result<&'a PanelHandle, UsageError> {
        self.panel.ok_or(UsageError::OutsidePanel)
    }

    /// Store operations bound to this scope. Panels created through it
    /// record this scope as their origin.
    #[must_use]
    pub fn controller(&self) -> &PanelController {
        &self.controller
    }
}

impl fmt::Debug for RenderCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("scope", &self.scope)
            .field("panel", &self.panel.map(PanelHandle::id))
            .finish_non_exhaustive()
    }
}
