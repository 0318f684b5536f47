//! TypeScript output: the discord.js builder chains plus type annotations.

use super::discordjs::component_list;
use super::{Entry, Imports};

pub fn format_typescript(entries: &[Entry<'_>]) -> String {
    let mut imports = Imports::default();
    let body = component_list(entries, &mut imports);
    format!(
        "import type {{ DiscordComponent, DiscordMessage }} from './types';\n\
         import {{ {} }} from 'discord.js';\n\n\
         const components: DiscordComponent[] = [\n{body}\n];\n\n\
         const message: DiscordMessage = {{\n  components,\n  flags: MessageFlags.IsComponentsV2,\n}};\n\n\
         await interaction.reply(message);",
        imports.with_message_flags()
    )
}
