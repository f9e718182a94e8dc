use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-3 rounded-lg border py-4 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col gap-1 px-4"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
    clx! {CardContent, div, "px-4"}
    clx! {CardFooter, footer, "flex items-center gap-2 px-4"}
}

#[allow(unused_imports)]
pub use components::*;
