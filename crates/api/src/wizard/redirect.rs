//! Destination of a successful submission.

use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::permissions::TabPermissionResolver;
use admission_core::tabs::TabTree;

use super::Submission;

/// Where to send the candidate after `tab` was saved.
///
/// `redirect_to` always wins. With "submit and continue" the next tab in
/// traversal order is opened, for edition when the candidate may update
/// it and read-only otherwise. In every other case, including the last
/// tab, the read view of the saved tab is shown.
pub fn success_url(
    resolver: &TabPermissionResolver,
    tree: &TabTree,
    context: AdmissionContext,
    admission: &Admission,
    tab: &str,
    submission: &Submission,
) -> String {
    if let Some(target) = &submission.redirect_to {
        return target.clone();
    }
    // A step outside the tree (the training choice of a doctorate) leads
    // to the start of the wizard.
    let in_tree = tree.contains(tab);
    if submission.submit_and_continue {
        let next = if in_tree { tree.next_tab(tab) } else { tree.first_tab() };
        if let Some(next) = next {
            return if resolver.can_update_tab(admission, next.name) {
                context.tab_update_url(admission.uuid, next.name)
            } else {
                context.tab_url(admission.uuid, next.name)
            };
        }
    }
    if in_tree {
        context.tab_url(admission.uuid, tab)
    } else {
        context.home_url(admission.uuid)
    }
}
