use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::config::ResolvedConfig;
use crate::tokens::extract::{ThemeTexts, build_document};

/// A throwaway project tree for store, pipeline and protocol tests.
pub struct Project {
    dir: TempDir,
}

pub const PALETTE_TS: &str = r#"
export const palette = {
  primary: { main: '#266079', light: '#5a8ea6', dark: '#1a4355', contrastText: '#ffffff' },
  secondary: { main: '#7b61ff' },
  error: { main: '#d32f2f' },
  grey: { 100: '#f5f5f5', 900: '#212121' },
  text: { primary: '#1a1a1a', secondary: '#666666' },
  background: { default: '#f7f8fa', paper: '#ffffff' },
  divider: '#e0e0e0',
};
"#;

pub const TYPOGRAPHY_TS: &str = r#"
export const typography = {
  fontFamily: '"Inter", sans-serif',
  h1: { fontSize: '48px', fontWeight: 600, lineHeight: '56px' },
  body1: { fontSize: '16px', fontWeight: 400, lineHeight: 1.5 },
  button: { fontSize: '14px', fontWeight: 600, textTransform: 'none' },
};
"#;

pub const THEME_TS: &str = r#"
const shadows = [
  'none',
  '0px 1px 2px rgba(0,0,0,0.05)', // subtle
  '0px 4px 8px rgba(0,0,0,0.12)',
];
"#;

pub const BUTTON_TSX: &str = r#"import React from 'react';
import MuiButton from '@mui/material/Button';

export interface ButtonProps {
  /**
   * The visual style of the button
   * @default 'contained'
   */
  variant?: 'contained' | 'outlined' | 'text';
  /** Button label content */
  children: React.ReactNode;
  /** Disable the button */
  disabled?: boolean;
  className?: string;
}

/**
 * Buttons allow users to take actions
 * with a single tap.
 */
export const Button: React.FC<ButtonProps> = ({ variant = 'contained', disabled = false, children }) => (
  <MuiButton variant={variant} disabled={disabled}>{children}</MuiButton>
);
"#;

pub const BUTTON_STORIES_TSX: &str = r#"import type { Meta, StoryObj } from '@storybook/react';
import { Button } from './Button';

const meta: Meta<typeof Button> = { component: Button };
export default meta;
type Story = StoryObj<typeof meta>;

export const Primary: Story = {
  args: {
    variant: 'contained',
    children: 'Save',
  },
};
"#;

pub const BADGE_TSX: &str = r#"import React from 'react';

export interface BadgeProps {
  /** Text shown in the badge */
  label: string;
  /** Tone of the badge */
  tone?: 'neutral' | 'success';
}

export const Badge = ({ label, tone = 'neutral' }: BadgeProps) => <span data-tone={tone}>{label}</span>;
"#;

pub const DROPDOWN_TSX: &str = r#"import React from 'react';
import { Select as MuiSelect, MenuItem } from '@mui/material';

/** Select a single value from a list of options */
export interface DropdownProps {
  /** Options to choose from */
  options: { label: string; value: string }[];
  /** Current value */
  value?: string;
}

export function Dropdown({ options, value }: DropdownProps) {
  return <MuiSelect value={value}>{options.map((o) => <MenuItem key={o.value}>{o.label}</MenuItem>)}</MuiSelect>;
}
"#;

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ResolvedConfig {
        ResolvedConfig::defaults(self.path())
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn write_json(&self, rel: &str, value: &Value) {
        self.write(rel, &format!("{}\n", serde_json::to_string_pretty(value).unwrap()));
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read(rel)).unwrap()
    }

    /// Component sources and theme files, nothing generated yet.
    pub fn with_sources() -> Self {
        let project = Self::new();
        project.write("src/components/atoms/Button/Button.tsx", BUTTON_TSX);
        project.write("src/components/atoms/Button/Button.stories.tsx", BUTTON_STORIES_TSX);
        project.write("src/components/atoms/Badge/Badge.tsx", BADGE_TSX);
        project.write("src/components/atoms/Notes/README.md", "not a component");
        project.write("src/components/molecules/Dropdown/Dropdown.tsx", DROPDOWN_TSX);
        project.write("src/theme/palette.ts", PALETTE_TS);
        project.write("src/theme/typography.ts", TYPOGRAPHY_TS);
        project.write("src/theme/index.ts", THEME_TS);
        project
    }

    /// A populated store: registry, five metadata files and a token document.
    pub fn with_store() -> Self {
        let project = Self::new();
        let components = fixture_components();

        let entries: Vec<Value> = components
            .iter()
            .map(|meta| {
                let name = meta["name"].as_str().unwrap();
                let category = meta["category"].as_str().unwrap();
                json!({
                    "name": name,
                    "displayName": meta["displayName"],
                    "category": category,
                    "storagePath": format!("src/components/{category}s/{name}"),
                    "metadataFileName": format!("{name}.meta.json"),
                    "externalMappingName": meta
                        .get("externalMapping")
                        .map(|m| m["name"].clone())
                        .unwrap_or(Value::Null),
                    "status": "stable",
                })
            })
            .collect();
        project.write_json(
            "src/tokens/components-registry.json",
            &json!({
                "totalComponents": 5,
                "categories": { "atoms": 3, "molecules": 1, "organisms": 1 },
                "components": entries,
            }),
        );

        for meta in &components {
            let name = meta["name"].as_str().unwrap();
            let category = meta["category"].as_str().unwrap();
            project.write_json(
                &format!("src/components/{category}s/{name}/{name}.meta.json"),
                meta,
            );
        }

        let sources = ThemeTexts {
            palette: Some(PALETTE_TS.to_string()),
            typography: Some(TYPOGRAPHY_TS.to_string()),
            shadows: Some(THEME_TS.to_string()),
        };
        let doc = build_document(&sources, 8, "Design System");
        crate::store::write_json(&project.path().join("src/tokens/tokens.json"), &doc).unwrap();
        project
    }
}

fn prop(name: &str, ty: &str, required: bool, description: &str) -> Value {
    json!({ "name": name, "type": ty, "required": required, "description": description })
}

fn basic_example(name: &str) -> Value {
    json!([{
        "title": "Basic Usage",
        "description": format!("Basic usage of {name}"),
        "code": format!("import {{ {name} }} from '@/components';\n\n<{name} />"),
    }])
}

fn migration(external: &str, name: &str) -> Value {
    json!([{
        "before": format!("import {{ {external} }} from '@mui/material';\n<{external} />"),
        "after": format!("import {{ {name} }} from '@/components';\n<{name} />"),
        "description": format!("Replace {external} from @mui/material with {name}"),
    }])
}

/// Registry order: Button, IconButton, Badge, Dropdown, DataTable.
pub fn fixture_components() -> Vec<Value> {
    vec![
        json!({
            "name": "Button",
            "displayName": "Button",
            "category": "atom",
            "description": "Buttons allow users to take actions with a single tap",
            "externalMapping": { "name": "Button", "packageName": "@mui/material" },
            "props": [
                {
                    "name": "variant", "type": "'contained' | 'outlined' | 'text'",
                    "required": false, "defaultValue": "contained",
                    "description": "The visual style of the button"
                },
                prop("children", "React.ReactNode", true, "Button label content"),
                {
                    "name": "disabled", "type": "boolean", "required": false,
                    "defaultValue": false, "description": "Disable the button"
                },
                prop("onClick", "() => void", false, "Click handler"),
            ],
            "examples": basic_example("Button"),
            "migrationExamples": migration("Button", "Button"),
            "relatedComponents": ["IconButton"],
            "usageGuidelines": {
                "whenToUse": ["Primary actions in forms and dialogs", "Submitting data"],
                "whenNotToUse": ["Navigation between pages (use Link instead)"],
                "bestPractices": ["Use one primary button per view"],
                "commonPatterns": []
            },
            "importPath": "@/components/atoms/Button",
            "exportPath": "@/components"
        }),
        json!({
            "name": "IconButton",
            "displayName": "Icon Button",
            "category": "atom",
            "description": "Compact button that shows only an icon",
            "externalMapping": { "name": "IconButton", "packageName": "@mui/material" },
            "props": [
                prop("icon", "React.ReactNode", true, "Icon to display"),
                prop("onClick", "() => void", false, "Click handler"),
            ],
            "examples": basic_example("IconButton"),
            "migrationExamples": migration("IconButton", "IconButton"),
            "accessibility": {
                "ariaAttributes": ["aria-label"],
                "keyboardNavigation": "Enter and Space activate the button"
            },
            "usageGuidelines": {
                "whenToUse": ["Toolbar actions with recognizable icons"],
                "whenNotToUse": [],
                "bestPractices": ["Always provide an aria-label"],
                "commonPatterns": []
            },
            "importPath": "@/components/atoms/IconButton",
            "exportPath": "@/components"
        }),
        json!({
            "name": "Badge",
            "displayName": "Badge",
            "category": "atom",
            "description": "Small status indicator",
            "props": [prop("label", "string", true, "Text shown in the badge")],
            "examples": basic_example("Badge"),
            "importPath": "@/components/atoms/Badge",
            "exportPath": "@/components"
        }),
        json!({
            "name": "Dropdown",
            "displayName": "Dropdown",
            "category": "molecule",
            "description": "Select a single value from a list of options",
            "externalMapping": { "name": "Select", "packageName": "@mui/material" },
            "props": [
                prop("options", "{ label: string; value: string }[]", true, "Options to choose from"),
                prop("value", "string", false, "Current value"),
            ],
            "examples": basic_example("Dropdown"),
            "migrationExamples": migration("Select", "Dropdown"),
            "usageGuidelines": {
                "whenToUse": ["Choosing one option from a long list"],
                "whenNotToUse": ["Fewer than five options (use RadioGroup instead)"],
                "bestPractices": [],
                "commonPatterns": []
            },
            "importPath": "@/components/molecules/Dropdown",
            "exportPath": "@/components"
        }),
        json!({
            "name": "DataTable",
            "displayName": "Data Table",
            "category": "organism",
            "description": "Displays tabular data with sorting and pagination",
            "externalMapping": { "name": "Table", "packageName": "@mui/material" },
            "props": [
                prop("rows", "Row[]", true, "Rows to render"),
                prop("columns", "Column[]", true, "Column definitions"),
            ],
            "examples": basic_example("DataTable"),
            "migrationExamples": migration("Table", "DataTable"),
            "importPath": "@/components/organisms/DataTable",
            "exportPath": "@/components"
        }),
    ]
}
