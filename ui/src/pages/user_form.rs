use payloads::UserRole;
use payloads::requests::AdminUserRequest;
use payloads::responses::AdminUser;
use std::collections::BTreeMap;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use super::report_mutation_error;
use crate::contexts::toast::use_toast;
use crate::get_api_client;

#[derive(Debug, Clone, PartialEq)]
struct UserDraft {
    email: String,
    phone: String,
    role: UserRole,
    active: bool,
}

impl UserDraft {
    fn new(user: Option<&AdminUser>) -> Self {
        match user {
            Some(user) => Self {
                email: user.email.clone(),
                phone: user.phone.clone().unwrap_or_default(),
                role: user.role,
                active: user.active.unwrap_or(true),
            },
            None => Self {
                email: String::new(),
                phone: String::new(),
                role: UserRole::Client,
                active: true,
            },
        }
    }

    fn request(&self) -> AdminUserRequest {
        let phone = self.phone.trim();
        AdminUserRequest {
            email: self.email.trim().to_owned(),
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
            role: self.role,
            active: Some(self.active),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct UserFormProps {
    /// User being edited, `None` to create one
    #[prop_or_default]
    pub user: Option<AdminUser>,
    pub on_saved: Callback<()>,
    pub on_cancel: Callback<()>,
}

/// Create or edit form. Field errors, whether from the local checks or a
/// 422 response, are shown under the matching input.
#[function_component]
pub fn UserForm(props: &UserFormProps) -> Html {
    let toasts = use_toast();
    let draft = {
        let user = props.user.clone();
        use_state(move || UserDraft::new(user.as_ref()))
    };
    let errors = use_state(BTreeMap::<String, String>::new);
    let is_saving = use_state(|| false);
    let editing = props.user.as_ref().map(|user| user.id);

    let update = |apply: fn(&mut UserDraft, String)| {
        let draft = draft.clone();
        Callback::from(move |value: String| {
            let mut next = (*draft).clone();
            apply(&mut next, value);
            draft.set(next);
        })
    };
    let on_email = update(|draft, value| draft.email = value);
    let on_phone = update(|draft, value| draft.phone = value);
    let on_role = update(|draft, value| {
        if let Some(role) = UserRole::parse(&value) {
            draft.role = role;
        }
    });
    let on_active = {
        let draft = draft.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*draft).clone();
            next.active = input.checked();
            draft.set(next);
        })
    };

    let on_submit = {
        let draft = draft.clone();
        let errors = errors.clone();
        let is_saving = is_saving.clone();
        let on_saved = props.on_saved.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let request = draft.request();
            let invalid = request.validation_errors();
            if !invalid.is_empty() {
                errors.set(invalid);
                return;
            }
            errors.set(BTreeMap::new());

            let errors = errors.clone();
            let is_saving = is_saving.clone();
            let on_saved = on_saved.clone();
            let toasts = toasts.clone();
            yew::platform::spawn_local(async move {
                is_saving.set(true);
                let api_client = get_api_client();
                let result = match editing {
                    Some(id) => api_client.update_user(id, &request).await,
                    None => api_client.create_user(&request).await,
                };
                is_saving.set(false);
                match result {
                    Ok(user) => {
                        let verb = if editing.is_some() { "mis à jour" } else { "créé" };
                        toasts.success(format!("{} {verb}", user.email));
                        on_saved.emit(());
                    }
                    Err(e) => match e.field_errors() {
                        Some(fields) if !fields.is_empty() => errors.set(fields.clone()),
                        _ => report_mutation_error(&toasts, &e),
                    },
                }
            });
        })
    };

    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    let field_error = |field: &str| -> Html {
        match errors.get(field) {
            Some(message) => html! {
                <p class="mt-1 text-xs text-red-600 dark:text-red-400">{message}</p>
            },
            None => html! {},
        }
    };
    let input_class = |field: &str| {
        classes!(
            "w-full", "rounded-md", "bg-white", "dark:bg-neutral-700", "px-3", "py-2",
            "border",
            if errors.contains_key(field) {
                "border-red-500"
            } else {
                "border-neutral-300 dark:border-neutral-600"
            }
        )
    };
    let title = if editing.is_some() { "Modifier l'utilisateur" } else { "Nouvel utilisateur" };

    html! {
        <form
            onsubmit={on_submit}
            class="mb-6 p-4 space-y-4 rounded-lg border border-neutral-200 \
                   dark:border-neutral-700 bg-neutral-50 dark:bg-neutral-800"
        >
            <h3 class="text-lg font-medium">{title}</h3>
            <div class="grid gap-4 sm:grid-cols-2">
                <label class="block text-sm">
                    {"E-mail"}
                    <input
                        type="text"
                        inputmode="email"
                        value={draft.email.clone()}
                        oninput={on_email.reform(|e: InputEvent| {
                            e.target_unchecked_into::<HtmlInputElement>().value()
                        })}
                        class={input_class("email")}
                    />
                    {field_error("email")}
                </label>
                <label class="block text-sm">
                    {"Téléphone"}
                    <input
                        type="tel"
                        value={draft.phone.clone()}
                        oninput={on_phone.reform(|e: InputEvent| {
                            e.target_unchecked_into::<HtmlInputElement>().value()
                        })}
                        class={input_class("phone")}
                    />
                    {field_error("phone")}
                </label>
                <label class="block text-sm">
                    {"Rôle"}
                    <select
                        onchange={on_role.reform(|e: Event| {
                            e.target_unchecked_into::<HtmlSelectElement>().value()
                        })}
                        class={input_class("role")}
                    >
                        {for UserRole::ALL.iter().map(|role| html! {
                            <option value={role.to_string()} selected={*role == draft.role}>
                                {role.label()}
                            </option>
                        })}
                    </select>
                    {field_error("role")}
                </label>
                <label class="flex items-center gap-2 text-sm self-end">
                    <input type="checkbox" checked={draft.active} onchange={on_active} />
                    {"Compte actif"}
                </label>
            </div>
            <div class="flex justify-end gap-3">
                <button
                    type="button"
                    onclick={on_cancel}
                    class="px-4 py-2 rounded-md text-sm text-neutral-700 dark:text-neutral-300"
                >
                    {"Annuler"}
                </button>
                <button
                    type="submit"
                    disabled={*is_saving}
                    class="px-4 py-2 rounded-md text-sm bg-neutral-900 text-white disabled:opacity-50"
                >
                    {if *is_saving { "Enregistrement..." } else { "Enregistrer" }}
                </button>
            </div>
        </form>
    }
}
